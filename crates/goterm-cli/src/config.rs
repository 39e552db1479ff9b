//! Default resolution for CLI inputs.
//!
//! Every input follows the same precedence:
//! 1) command-line flag
//! 2) environment variable (`GOTERM_*`)
//! 3) built-in default, where one exists
//!
//! Empty environment values count as unset.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub(crate) const GOTERM_OBO_FILE_ENV: &str = "GOTERM_OBO_FILE";
pub(crate) const GOTERM_MAPPING_FILE_ENV: &str = "GOTERM_MAPPING_FILE";
pub(crate) const GOTERM_DATA_SOURCE_ENV: &str = "GOTERM_DATA_SOURCE";
pub(crate) const GOTERM_GO_ID_ENV: &str = "GOTERM_GO_ID";

const DEFAULT_OBO_FILE_NAME: &str = "gene_ontology.obo";
/// Glycolysis; small, well-annotated, handy for trying things out.
const DEFAULT_GO_ID: &str = "GO:0006096";

fn env_value(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(v) => {
            let v = v.trim();
            Ok((!v.is_empty()).then(|| v.to_string()))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("failed to read {name}: {e}")),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Resolve the ontology file.
///
/// Precedence:
/// 1) `--obo`
/// 2) env var `GOTERM_OBO_FILE`
/// 3) `$HOME/gene_ontology.obo`
pub(crate) fn resolve_obo_file(flag: Option<PathBuf>) -> Result<PathBuf> {
    pick_obo_file(flag, env_value(GOTERM_OBO_FILE_ENV)?, home_dir())
}

fn pick_obo_file(
    flag: Option<PathBuf>,
    env: Option<String>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Some(p) = env {
        return Ok(PathBuf::from(p));
    }
    home.map(|h| h.join(DEFAULT_OBO_FILE_NAME)).ok_or_else(|| {
        anyhow!("no ontology file: pass --obo or set {GOTERM_OBO_FILE_ENV}")
    })
}

/// Resolve the GO→gene mapping table. There is no default.
pub(crate) fn resolve_mapping_file(flag: Option<PathBuf>) -> Result<PathBuf> {
    pick_mapping_file(flag, env_value(GOTERM_MAPPING_FILE_ENV)?)
}

fn pick_mapping_file(flag: Option<PathBuf>, env: Option<String>) -> Result<PathBuf> {
    flag.or_else(|| env.map(PathBuf::from)).ok_or_else(|| {
        anyhow!("no mapping table: pass --mapping or set {GOTERM_MAPPING_FILE_ENV}")
    })
}

/// Resolve the data source label attached to mapped genes.
pub(crate) fn resolve_data_source(flag: Option<String>) -> Result<String> {
    Ok(pick_data_source(flag, env_value(GOTERM_DATA_SOURCE_ENV)?))
}

fn pick_data_source(flag: Option<String>, env: Option<String>) -> String {
    flag.or(env)
        .unwrap_or_else(|| goterm_mapping::DEFAULT_DATA_SOURCE.to_string())
}

/// Resolve the term ids a command operates on; falls back to a single default id.
pub(crate) fn resolve_go_ids(ids: Vec<String>) -> Result<Vec<String>> {
    Ok(pick_go_ids(ids, env_value(GOTERM_GO_ID_ENV)?))
}

fn pick_go_ids(ids: Vec<String>, env: Option<String>) -> Vec<String> {
    if !ids.is_empty() {
        return ids;
    }
    vec![env.unwrap_or_else(|| DEFAULT_GO_ID.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obo_file_precedence() {
        let flag = Some(PathBuf::from("/flag.obo"));
        let env = Some("/env.obo".to_string());
        let home = Some(PathBuf::from("/home/me"));

        assert_eq!(
            pick_obo_file(flag, env.clone(), home.clone()).unwrap(),
            PathBuf::from("/flag.obo")
        );
        assert_eq!(
            pick_obo_file(None, env, home.clone()).unwrap(),
            PathBuf::from("/env.obo")
        );
        assert_eq!(
            pick_obo_file(None, None, home).unwrap(),
            PathBuf::from("/home/me/gene_ontology.obo")
        );
        assert!(pick_obo_file(None, None, None).is_err());
    }

    #[test]
    fn mapping_file_has_no_default() {
        let err = pick_mapping_file(None, None).unwrap_err();
        assert!(err.to_string().contains(GOTERM_MAPPING_FILE_ENV));
        assert_eq!(
            pick_mapping_file(None, Some("/m.txt".into())).unwrap(),
            PathBuf::from("/m.txt")
        );
    }

    #[test]
    fn data_source_and_ids_fall_back_to_defaults() {
        assert_eq!(pick_data_source(None, None), "Ensembl Human");
        assert_eq!(pick_data_source(Some("Entrez Gene".into()), Some("x".into())), "Entrez Gene");
        assert_eq!(pick_go_ids(vec![], None), vec!["GO:0006096".to_string()]);
        assert_eq!(
            pick_go_ids(vec![], Some("GO:0008150".into())),
            vec!["GO:0008150".to_string()]
        );
        assert_eq!(
            pick_go_ids(vec!["GO:1".into()], Some("GO:2".into())),
            vec!["GO:1".to_string()]
        );
    }
}
