use super::{expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::signed_releases::{RELEASES_ARE_SIGNED, RELEASES_HAVE_PROVENANCE};
use std::collections::BTreeMap;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[RELEASES_ARE_SIGNED, RELEASES_HAVE_PROVENANCE])?;

    // release tag -> signed; releases without assets never get an entry
    let mut releases: BTreeMap<&str, bool> = BTreeMap::new();
    for f in findings {
        let Some(tag) = f.value("release") else {
            continue;
        };
        match f.outcome {
            Outcome::True => {
                releases.insert(tag, true);
                log_finding(dl, DetailKind::Info, f);
            }
            Outcome::False => {
                releases.entry(tag).or_insert(false);
            }
            _ => log_finding(dl, DetailKind::Debug, f),
        }
    }
    for f in findings.iter().filter(|f| f.probe == RELEASES_ARE_SIGNED && f.outcome == Outcome::False) {
        if f.value("release").and_then(|t| releases.get(t).copied()) == Some(false) {
            log_finding(dl, DetailKind::Warn, f);
        }
    }

    if releases.is_empty() {
        return Ok(CheckResult::inconclusive(name, "no releases found"));
    }
    let total = u32::try_from(releases.len()).unwrap_or(u32::MAX);
    let signed = u32::try_from(releases.values().filter(|s| **s).count()).unwrap_or(u32::MAX);
    Ok(CheckResult::proportional(
        name,
        format!("{signed} out of {total} releases are signed or have provenance"),
        signed,
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{Release, ReleaseAsset};
    use crate::probes::signed_releases::run;
    use crate::raw::SignedReleaseData;

    fn release(tag: &str, assets: &[&str]) -> Release {
        Release {
            tag_name: tag.to_string(),
            target_commitish: String::new(),
            url: String::new(),
            assets: assets
                .iter()
                .map(|a| ReleaseAsset {
                    name: a.to_string(),
                    url: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_assetless_releases_excluded() {
        let data = SignedReleaseData {
            releases: vec![
                release("v3", &["x.tgz", "x.tgz.sig"]),
                release("v2", &["x.tgz", "x.intoto.jsonl"]),
                release("v1", &["x.tgz"]),
                release("v0", &[]),
            ],
        };
        let dl = DetailLogger::new();
        let result = evaluate("Signed-Releases", &run(&data), &dl).expect("evaluate");
        // 2 of 3 releases with assets
        assert_eq!(result.score, 7);
        assert!(dl.flush().iter().any(|d| d.kind == DetailKind::Warn));
    }

    #[test]
    fn test_mixed_assets_count_as_signed() {
        let data = SignedReleaseData {
            releases: vec![
                release("v2", &["x.tgz.asc", "x.zip.sig"]),
                release("v1", &["x.tgz", "x.tgz.minisig", "checksums.txt"]),
            ],
        };
        let dl = DetailLogger::new();
        let result = evaluate("Signed-Releases", &run(&data), &dl).expect("evaluate");
        assert_eq!(result.score, 10);
        assert!(!dl.flush().iter().any(|d| d.kind == DetailKind::Warn));
    }

    #[test]
    fn test_no_releases_is_inconclusive() {
        let result = evaluate("Signed-Releases", &run(&SignedReleaseData::default()), &DetailLogger::new())
            .expect("evaluate");
        assert_eq!(result.score, -1);
    }
}
