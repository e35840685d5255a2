//! Workflow document (`info.plist`).
//!
//! Only the three sections searchio generates into are typed: `objects`
//! (nodes), `connections` (source uid → sinks) and `uidata` (uid → layout).
//! Every other key, at any level, is carried through untouched in the
//! `extra` maps so hand-authored content survives a rewrite.

use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use plist::{Dictionary, Value};
use serde::{Deserialize, Serialize};

use super::persist::write_atomic;
use crate::error::SearchioResult;

/// Node type of script filters.
pub const SCRIPT_FILTER_TYPE: &str = "alfred.workflow.input.scriptfilter";

/// Layout key the launcher only writes for nodes a human has edited.
pub const HUMAN_MARKER: &str = "colorindex";

/// Parsed workflow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub objects: Vec<Node>,

    #[serde(default)]
    pub connections: BTreeMap<String, Vec<Connection>>,

    #[serde(default)]
    pub uidata: BTreeMap<String, LayoutMeta>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One workflow object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Dictionary>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Node {
    /// String value of a `config` entry.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.as_ref()?.get(key)?.as_string()
    }
}

/// Edge from a node to a downstream node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub destinationuid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiersubtext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitoclose: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Connection {
    /// Plain connection to `destination` with no modifier keys.
    pub fn to(destination: &str) -> Self {
        Self {
            destinationuid: destination.to_string(),
            modifiers: Some(0),
            modifiersubtext: Some(String::new()),
            vitoclose: Some(false),
            extra: BTreeMap::new(),
        }
    }
}

/// Canvas coordinate; the launcher writes both integers and reals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Integer(i64),
    Real(f64),
}

impl Coordinate {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Coordinate::Integer(i) => i as f64,
            Coordinate::Real(f) => f,
        }
    }
}

/// Layout entry of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpos: Option<Coordinate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ypos: Option<Coordinate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorindex: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LayoutMeta {
    /// Whether a human has edited this node in the launcher.
    pub fn is_human_authored(&self) -> bool {
        self.colorindex.is_some()
    }
}

impl WorkflowDocument {
    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> SearchioResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a binary or XML property list.
    pub fn from_bytes(bytes: &[u8]) -> SearchioResult<Self> {
        Ok(plist::from_reader(Cursor::new(bytes))?)
    }

    /// Serialize as an XML property list.
    pub fn to_xml(&self) -> SearchioResult<Vec<u8>> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self)?;
        Ok(buf)
    }

    /// Atomically replace the document at `path`.
    pub fn save(&self, path: &Path) -> SearchioResult<()> {
        let bytes = self.to_xml()?;
        write_atomic(path, &bytes)?;
        Ok(())
    }

    pub fn node(&self, uid: &str) -> Option<&Node> {
        self.objects.iter().find(|n| n.uid == uid)
    }

    /// Whether `node` is machine-generated: a script filter whose layout
    /// entry exists and carries no human marker.
    pub fn is_generated(&self, node: &Node) -> bool {
        node.kind == SCRIPT_FILTER_TYPE
            && self
                .uidata
                .get(&node.uid)
                .is_some_and(|meta| !meta.is_human_authored())
    }

    /// Uids of all generated nodes, in document order.
    pub fn generated_uids(&self) -> Vec<String> {
        self.objects
            .iter()
            .filter(|n| self.is_generated(n))
            .map(|n| n.uid.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>bundleid</key>
	<string>net.deanishe.alfred-searchio</string>
	<key>connections</key>
	<dict>
		<key>google-en</key>
		<array>
			<dict>
				<key>destinationuid</key>
				<string>OPEN</string>
				<key>modifiers</key>
				<integer>0</integer>
				<key>modifiersubtext</key>
				<string></string>
				<key>vitoclose</key>
				<false/>
			</dict>
		</array>
	</dict>
	<key>objects</key>
	<array>
		<dict>
			<key>config</key>
			<dict>
				<key>browser</key>
				<string></string>
			</dict>
			<key>type</key>
			<string>alfred.workflow.action.openurl</string>
			<key>uid</key>
			<string>OPEN</string>
			<key>version</key>
			<integer>1</integer>
		</dict>
		<dict>
			<key>config</key>
			<dict>
				<key>keyword</key>
				<string>g</string>
				<key>title</key>
				<string>Google (English)</string>
			</dict>
			<key>type</key>
			<string>alfred.workflow.input.scriptfilter</string>
			<key>uid</key>
			<string>google-en</string>
			<key>version</key>
			<integer>2</integer>
		</dict>
	</array>
	<key>readme</key>
	<string>Hand-written readme</string>
	<key>uidata</key>
	<dict>
		<key>OPEN</key>
		<dict>
			<key>colorindex</key>
			<integer>3</integer>
			<key>xpos</key>
			<real>600.5</real>
			<key>ypos</key>
			<integer>220</integer>
		</dict>
		<key>google-en</key>
		<dict>
			<key>note</key>
			<string>Google (English)</string>
			<key>xpos</key>
			<integer>270</integer>
			<key>ypos</key>
			<integer>220</integer>
		</dict>
	</dict>
	<key>version</key>
	<string>1.40.0</string>
</dict>
</plist>
"#;

    #[test]
    fn test_parse_sample() {
        let doc = WorkflowDocument::from_bytes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(doc.objects.len(), 2);
        assert_eq!(doc.connections["google-en"][0].destinationuid, "OPEN");
        assert_eq!(doc.uidata["OPEN"].xpos, Some(Coordinate::Real(600.5)));
        assert_eq!(doc.uidata["google-en"].ypos, Some(Coordinate::Integer(220)));
        assert_eq!(
            doc.extra.get("readme").and_then(|v| v.as_string()),
            Some("Hand-written readme")
        );
        assert_eq!(doc.node("google-en").unwrap().config_str("keyword"), Some("g"));
    }

    #[test]
    fn test_generated_detection() {
        let doc = WorkflowDocument::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.generated_uids(), vec!["google-en".to_string()]);

        let open = doc.node("OPEN").unwrap();
        assert!(!doc.is_generated(open));
        assert!(doc.uidata["OPEN"].is_human_authored());
    }

    #[test]
    fn test_untouched_content_survives_roundtrip() {
        let doc = WorkflowDocument::from_bytes(SAMPLE.as_bytes()).unwrap();
        let xml = doc.to_xml().unwrap();
        let again = WorkflowDocument::from_bytes(&xml).unwrap();

        assert_eq!(again, doc);
        let text = String::from_utf8(xml).unwrap();
        assert!(text.contains("<real>600.5</real>"));
        assert!(text.contains("net.deanishe.alfred-searchio"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("info.plist");

        let doc = WorkflowDocument::from_bytes(SAMPLE.as_bytes()).unwrap();
        doc.save(&path).unwrap();

        assert_eq!(WorkflowDocument::load(&path).unwrap(), doc);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(WorkflowDocument::load(&temp_dir.path().join("info.plist")).is_err());
    }
}
