//! Canonical JSON utilities (raffle_io)
//! - Objects: keys sorted lexicographically (byte order)
//! - Arrays: order preserved (winner order is meaningful)
//! - Output: compact, no trailing newline
//! - Atomic write: temp file in the target directory + fsync + rename

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::{IoError, IoResult};

/// Canonical bytes of an already-parsed JSON value.
pub fn to_canonical_bytes(v: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);
    write_value(v, &mut out);
    out
}

/// Canonical bytes of any serializable value.
pub fn to_canonical_bytes_of<T: Serialize>(value: &T) -> IoResult<Vec<u8>> {
    let v = serde_json::to_value(value).map_err(|e| IoError::Hash(e.to_string()))?;
    Ok(to_canonical_bytes(&v))
}

/// Serialize `value` canonically and write it to `path` atomically.
pub fn write_canonical_file<T: Serialize>(value: &T, path: &Path) -> IoResult<()> {
    if crate::looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Path(format!("not a local path: {}", path.display())));
    }
    let bytes = to_canonical_bytes_of(value)?;
    write_atomic(path, &bytes).map_err(IoError::Write)
}

fn write_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_str(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            for (i, k) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_str(k, out);
                out.push(b':');
                write_value(&map[k.as_str()], out);
            }
            out.push(b'}');
        }
    }
}

fn write_str(s: &str, out: &mut Vec<u8>) {
    // Writing into a Vec cannot fail and a str always serializes.
    let _ = serde_json::to_writer(&mut *out, s);
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = tmp_path_for(path);
    let res = (|| {
        let mut f = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        drop(f);
        fs::rename(&tmp, path)
    })();
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}

/// "<filename>.<pid>.<counter>.tmp" next to `target`.
fn tmp_path_for(target: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("out");
    target.with_file_name(format!("{fname}.{}.{n}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_sorted_arrays_preserved() {
        let v = json!({
            "winners": [30, 10, 20],
            "category": "firstPrize",
            "meta": { "z": null, "a": true }
        });
        let s = String::from_utf8(to_canonical_bytes(&v)).unwrap();
        assert_eq!(
            s,
            r#"{"category":"firstPrize","meta":{"a":true,"z":null},"winners":[30,10,20]}"#
        );
    }

    #[test]
    fn strings_are_escaped() {
        let v = json!({ "name": "Zoë \"Z\"\n" });
        let s = String::from_utf8(to_canonical_bytes(&v)).unwrap();
        assert_eq!(s, "{\"name\":\"Zoë \\\"Z\\\"\\n\"}");
    }

    #[test]
    fn atomic_write_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        write_canonical_file(&json!({"b": 1, "a": 2}), &path).unwrap();
        write_canonical_file(&json!({"c": 3}), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"c":3}"#);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn rejects_url_targets() {
        let err = write_canonical_file(&json!({}), Path::new("https://x/out.json")).unwrap_err();
        assert!(matches!(err, IoError::Path(_)));
    }
}
