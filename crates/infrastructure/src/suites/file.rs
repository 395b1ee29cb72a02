//! On-disk shape of a suite file.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SuitesFile {
    #[serde(default)]
    pub payloads: BTreeMap<String, String>,
    pub suites: Vec<SuiteFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SuiteFile {
    pub name: String,
    #[serde(default)]
    pub cases: Vec<CaseFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct CaseFile {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: String,
    pub status: u16,
    #[serde(default)]
    pub expect: Option<String>,
    #[serde(default)]
    pub any_json: bool,
}
