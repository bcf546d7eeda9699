//! Receipts file.
//!
//! ```json
//! { "network": "...", "updated_at": "...",
//!   "transfers": { "<destination slug>": { "<salt>": {...} } },
//!   "deposits":  { "<chain slug>": { "<tx hash>": {...} } } }
//! ```
//!
//! Entries are merged field by field, so later steps (eg a mint) extend an entry instead of
//! replacing it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub const TRANSFERS: &str = "transfers";
pub const DEPOSITS: &str = "deposits";

/// One entry at `root[section][chain][key]`.
#[derive(Clone, Debug)]
pub struct Receipt {
    pub chain: String,
    pub key: String,
    pub fields: Value,
}

impl Receipt {
    pub fn new(chain: impl Into<String>, key: impl Into<String>, fields: Value) -> Self {
        Self {
            chain: chain.into(),
            key: key.into(),
            fields,
        }
    }
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

pub fn load(path: &Path) -> Result<Value> {
    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };
    Ok(if root.is_object() { root } else { json!({}) })
}

/// Merge `receipts` into `root[section]` of the file at `path`.
pub fn record(path: &Path, network: &str, section: &str, receipts: Vec<Receipt>) -> Result<()> {
    let mut root = load(path)?;
    root["network"] = json!(network);
    root["updated_at"] = json!(now_rfc3339());

    if !root[section].is_object() {
        root[section] = json!({});
    }
    for receipt in receipts {
        let chain = &mut root[section][receipt.chain.as_str()];
        if !chain.is_object() {
            *chain = json!({});
        }
        merge(&mut chain[receipt.key.as_str()], receipt.fields);
    }

    write_json_atomic(path, &root)
}

fn merge(target: &mut Value, fields: Value) {
    match (target, fields) {
        (Value::Object(existing), Value::Object(update)) => {
            for (k, v) in update {
                existing.insert(k, v);
            }
        }
        (target, fields) => *target = fields,
    }
}

/// Accepted transfers to `chain` that have mint calldata but no mint transaction yet.
pub fn pending_mints(root: &Value, chain: &str) -> Vec<(String, String)> {
    let Some(entries) = root[TRANSFERS][chain].as_object() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|(_, e)| e["outcome"] == "accepted" && e.get("mint_tx").is_none())
        .filter_map(|(key, e)| {
            e["mint_calldata"]
                .as_str()
                .map(|calldata| (key.clone(), calldata.to_string()))
        })
        .collect()
}

pub fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising receipts JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gateway-transfer-{}-{name}", std::process::id()))
            .join("transfers.testnet.json")
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn transfers_to_the_same_chain_are_kept_apart() {
        let path = scratch("same-chain");
        let _ = fs::remove_file(&path);

        record(
            &path,
            "testnet",
            TRANSFERS,
            vec![Receipt::new(
                "base-sepolia",
                "0xaa",
                json!({"outcome": "accepted", "transfer_id": "tr_1", "mint_calldata": "0x01"}),
            )],
        )
        .unwrap();
        record(
            &path,
            "testnet",
            TRANSFERS,
            vec![
                Receipt::new("base-sepolia", "0xbb", json!({"outcome": "rejected"})),
                Receipt::new("avalanche-fuji", "0xcc", json!({"outcome": "accepted"})),
            ],
        )
        .unwrap();

        let root = read(&path);
        assert_eq!(root["network"], "testnet");
        assert_eq!(root[TRANSFERS]["base-sepolia"]["0xaa"]["transfer_id"], "tr_1");
        assert_eq!(root[TRANSFERS]["base-sepolia"]["0xaa"]["mint_calldata"], "0x01");
        assert_eq!(root[TRANSFERS]["base-sepolia"]["0xbb"]["outcome"], "rejected");
        assert_eq!(root[TRANSFERS]["avalanche-fuji"]["0xcc"]["outcome"], "accepted");
        assert!(root["updated_at"].as_str().unwrap().contains('T'));
        assert!(!tmp_path_for(&path).exists());

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn later_steps_extend_an_entry() {
        let path = scratch("extend");
        let _ = fs::remove_file(&path);

        let accepted = json!({"outcome": "accepted", "transfer_id": "tr_1", "mint_calldata": "0x01"});
        record(&path, "testnet", TRANSFERS, vec![Receipt::new("base-sepolia", "0xaa", accepted)])
            .unwrap();
        assert_eq!(
            pending_mints(&read(&path), "base-sepolia"),
            vec![("0xaa".to_string(), "0x01".to_string())]
        );

        record(
            &path,
            "testnet",
            TRANSFERS,
            vec![Receipt::new("base-sepolia", "0xaa", json!({"mint_tx": "0xfeed"}))],
        )
        .unwrap();
        let root = read(&path);
        assert_eq!(root[TRANSFERS]["base-sepolia"]["0xaa"]["transfer_id"], "tr_1");
        assert_eq!(root[TRANSFERS]["base-sepolia"]["0xaa"]["mint_tx"], "0xfeed");
        assert!(pending_mints(&root, "base-sepolia").is_empty());
        assert!(pending_mints(&root, "avalanche-fuji").is_empty());

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn garbage_file_is_an_error() {
        let path = scratch("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert!(record(&path, "testnet", TRANSFERS, vec![]).is_err());
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn tmp_sits_next_to_target() {
        assert_eq!(
            tmp_path_for(Path::new("out/transfers.json")),
            PathBuf::from("out/transfers.json.tmp")
        );
    }
}
