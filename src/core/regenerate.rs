//! Script-filter regeneration.
//!
//! Generated nodes are never diffed. Every run strips all of them from the
//! document and rebuilds one node per search, so the output only depends on
//! the collection and the hand-authored content of the document.

use std::collections::{BTreeMap, HashSet};

use plist::{Dictionary, Value};
use tracing::{debug, warn};

use super::record::SearchRecord;
use super::repository::{by_title, RecordOrder};
use crate::config::{Config, LayoutConfig, OPEN_URL_UID};
use crate::services::document::{
    Connection, Coordinate, LayoutMeta, Node, WorkflowDocument, SCRIPT_FILTER_TYPE,
};

/// Node version written for generated script filters.
const SCRIPT_FILTER_VERSION: i64 = 2;

/// Outcome of a regeneration pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegenerationReport {
    /// Generated nodes removed from the document.
    pub removed: Vec<String>,
    /// Nodes written, in layout order.
    pub emitted: Vec<String>,
    /// Searches that produced no node.
    pub skipped: Vec<String>,
    /// Searches whose icons should be linked.
    pub targets: Vec<SearchRecord>,
}

/// Rebuilds the generated script filters of a workflow document.
#[derive(Clone)]
pub struct Regenerator {
    layout: LayoutConfig,
    sink_uid: String,
    search_command: String,
    order: RecordOrder,
}

fn int(n: i64) -> Value {
    Value::Integer(n.into())
}

impl Default for Regenerator {
    fn default() -> Self {
        Self::new(LayoutConfig::default(), OPEN_URL_UID, "./search")
    }
}

impl Regenerator {
    pub fn new(layout: LayoutConfig, sink_uid: &str, search_command: &str) -> Self {
        Self {
            layout,
            sink_uid: sink_uid.to_string(),
            search_command: search_command.to_string(),
            order: by_title,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.layout,
            &config.workflow.sink_uid,
            &config.workflow.search_command,
        )
    }

    /// Replace the node ordering.
    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    /// Remove every generated node along with its layout entry and outgoing
    /// connections. Returns the removed uids in document order.
    pub fn remove_generated(&self, doc: &mut WorkflowDocument) -> Vec<String> {
        let removed = doc.generated_uids();
        if removed.is_empty() {
            return removed;
        }

        let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
        doc.objects.retain(|n| !gone.contains(n.uid.as_str()));
        doc.uidata.retain(|uid, _| !gone.contains(uid.as_str()));
        doc.connections.retain(|uid, _| !gone.contains(uid.as_str()));

        debug!(count = removed.len(), "Removed generated nodes");
        removed
    }

    /// Replace the generated nodes of `doc` with one node per search.
    ///
    /// `only` restricts the searches that get nodes. Nodes for searches
    /// outside it are still removed, so callers that need the full set must
    /// pass `None`.
    pub fn regenerate(
        &self,
        doc: &mut WorkflowDocument,
        records: &[SearchRecord],
        only: Option<&HashSet<String>>,
    ) -> RegenerationReport {
        let mut report = RegenerationReport {
            removed: self.remove_generated(doc),
            ..Default::default()
        };

        let mut targets: Vec<SearchRecord> = records
            .iter()
            .filter(|r| only.map_or(true, |uids| uids.contains(&r.uid)))
            .cloned()
            .collect();
        targets.sort_by(self.order);

        let mut y = self.layout.y;
        for record in targets {
            if doc.node(&record.uid).is_some() {
                warn!(uid = %record.uid, "A hand-authored node already uses this uid, skipping");
                report.skipped.push(record.uid);
                continue;
            }

            if record.keyword.is_empty() {
                warn!(uid = %record.uid, title = %record.title, "Search has no keyword, skipping");
                report.skipped.push(record.uid.clone());
                report.targets.push(record);
                continue;
            }

            self.emit(doc, &record, y);
            y += self.layout.step;

            report.emitted.push(record.uid.clone());
            report.targets.push(record);
        }

        debug!(
            emitted = report.emitted.len(),
            skipped = report.skipped.len(),
            "Regenerated script filters"
        );
        report
    }

    fn emit(&self, doc: &mut WorkflowDocument, record: &SearchRecord, y: i64) {
        doc.objects.push(Node {
            uid: record.uid.clone(),
            kind: SCRIPT_FILTER_TYPE.to_string(),
            version: Some(SCRIPT_FILTER_VERSION),
            config: Some(self.script_filter_config(record)),
            extra: BTreeMap::new(),
        });

        doc.connections
            .insert(record.uid.clone(), vec![Connection::to(&self.sink_uid)]);

        doc.uidata.insert(
            record.uid.clone(),
            LayoutMeta {
                note: Some(record.title.clone()),
                xpos: Some(Coordinate::Integer(self.layout.x)),
                ypos: Some(Coordinate::Integer(y)),
                ..Default::default()
            },
        );
    }

    fn script_filter_config(&self, record: &SearchRecord) -> Dictionary {
        let script = format!("{} {} \"$1\"", self.search_command, record.uid);

        let entries: [(&str, Value); 18] = [
            ("alfredfiltersresults", Value::Boolean(false)),
            ("alfredfiltersresultsmatchmode", int(0)),
            ("argumenttrimmode", int(0)),
            ("argumenttype", int(0)),
            ("escaping", int(102)),
            ("keyword", Value::String(record.keyword.clone())),
            ("queuedelaycustom", int(3)),
            ("queuedelayimmediatelyinitially", Value::Boolean(false)),
            ("queuedelaymode", int(0)),
            ("queuemode", int(2)),
            ("runningsubtext", Value::String("Fetching results…".to_string())),
            ("script", Value::String(script)),
            ("scriptargtype", int(1)),
            ("scriptfile", Value::String(String::new())),
            ("subtext", Value::String("Searchio!".to_string())),
            ("title", Value::String(record.title.clone())),
            ("type", int(0)),
            ("withspace", Value::Boolean(true)),
        ];

        let mut config = Dictionary::new();
        for (key, value) in entries {
            config.insert(key.to_string(), value);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Origin;

    const HAND_AUTHORED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>connections</key>
	<dict>
		<key>MANUAL</key>
		<array>
			<dict>
				<key>destinationuid</key>
				<string>1133DEAA-5A8F-4E7D-9E9C-A76CB82D9F92</string>
			</dict>
		</array>
	</dict>
	<key>name</key>
	<string>Searchio!</string>
	<key>objects</key>
	<array>
		<dict>
			<key>type</key>
			<string>alfred.workflow.action.openurl</string>
			<key>uid</key>
			<string>1133DEAA-5A8F-4E7D-9E9C-A76CB82D9F92</string>
		</dict>
		<dict>
			<key>config</key>
			<dict>
				<key>keyword</key>
				<string>manual</string>
			</dict>
			<key>type</key>
			<string>alfred.workflow.input.scriptfilter</string>
			<key>uid</key>
			<string>MANUAL</string>
		</dict>
	</array>
	<key>uidata</key>
	<dict>
		<key>1133DEAA-5A8F-4E7D-9E9C-A76CB82D9F92</key>
		<dict>
			<key>colorindex</key>
			<integer>2</integer>
			<key>xpos</key>
			<integer>700</integer>
			<key>ypos</key>
			<integer>300</integer>
		</dict>
		<key>MANUAL</key>
		<dict>
			<key>colorindex</key>
			<integer>5</integer>
			<key>xpos</key>
			<real>40.5</real>
			<key>ypos</key>
			<integer>40</integer>
		</dict>
	</dict>
</dict>
</plist>
"#;

    fn doc() -> WorkflowDocument {
        WorkflowDocument::from_bytes(HAND_AUTHORED.as_bytes()).unwrap()
    }

    fn record(uid: &str, title: &str, keyword: &str) -> SearchRecord {
        SearchRecord {
            uid: uid.to_string(),
            keyword: keyword.to_string(),
            title: title.to_string(),
            search_url: "https://example.com/?q={query}".to_string(),
            suggest_url: None,
            icon: String::new(),
            percent_encode_query: false,
            json_path: "[1]".to_string(),
            origin: Origin::User,
        }
        .normalized()
        .unwrap()
    }

    fn ypos(doc: &WorkflowDocument, uid: &str) -> i64 {
        match doc.uidata[uid].ypos {
            Some(Coordinate::Integer(y)) => y,
            ref other => panic!("unexpected ypos {:?}", other),
        }
    }

    #[test]
    fn test_generated_node_shape() {
        let mut doc = doc();
        let report = Regenerator::default().regenerate(&mut doc, &[record("ddg", "DuckDuckGo", "d")], None);
        assert_eq!(report.emitted, vec!["ddg".to_string()]);

        let node = doc.node("ddg").unwrap();
        assert_eq!(node.kind, SCRIPT_FILTER_TYPE);
        assert_eq!(node.version, Some(2));
        assert_eq!(node.config_str("keyword"), Some("d"));
        assert_eq!(node.config_str("title"), Some("DuckDuckGo"));
        assert_eq!(node.config_str("script"), Some("./search ddg \"$1\""));
        assert_eq!(
            node.config.as_ref().unwrap().get("escaping"),
            Some(&int(102))
        );

        assert_eq!(doc.connections["ddg"], vec![Connection::to(OPEN_URL_UID)]);
        assert_eq!(doc.uidata["ddg"].note.as_deref(), Some("DuckDuckGo"));
        assert_eq!(doc.uidata["ddg"].xpos, Some(Coordinate::Integer(270)));
        assert!(doc.is_generated(node));
    }

    #[test]
    fn test_regenerate_twice_is_byte_identical() {
        let records = vec![
            record("b", "Bing", "b"),
            record("a", "Amazon", "a"),
            record("c", "Cnet", "c"),
        ];
        let regenerator = Regenerator::default();

        let mut doc = doc();
        regenerator.regenerate(&mut doc, &records, None);
        let first = doc.to_xml().unwrap();

        let report = regenerator.regenerate(&mut doc, &records, None);
        let second = doc.to_xml().unwrap();

        assert_eq!(first, second);
        assert_eq!(report.removed.len(), 3);
    }

    #[test]
    fn test_offsets_independent_of_previous_nodes() {
        let regenerator = Regenerator::default();
        let many: Vec<_> = (0..6)
            .map(|i| record(&format!("s{}", i), &format!("Search {}", i), "k"))
            .collect();
        let few = vec![record("x", "Xylo", "x"), record("y", "Yak", "y")];

        let mut doc = doc();
        regenerator.regenerate(&mut doc, &many, None);
        let report = regenerator.regenerate(&mut doc, &few, None);

        assert_eq!(report.removed.len(), 6);
        assert_eq!(report.emitted, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(ypos(&doc, "x"), 220);
        assert_eq!(ypos(&doc, "y"), 390);
        assert_eq!(doc.generated_uids().len(), 2);
    }

    #[test]
    fn test_offsets_strictly_increasing_by_step() {
        let layout = LayoutConfig { x: 10, y: 100, step: 50 };
        let regenerator = Regenerator::new(layout, OPEN_URL_UID, "./search");
        let records: Vec<_> = ["Delta", "Alpha", "Charlie", "Bravo"]
            .iter()
            .map(|t| record(&t.to_lowercase(), t, "k"))
            .collect();

        let mut doc = doc();
        let report = regenerator.regenerate(&mut doc, &records, None);

        assert_eq!(report.emitted, vec!["alpha", "bravo", "charlie", "delta"]);
        let ys: Vec<i64> = report.emitted.iter().map(|uid| ypos(&doc, uid)).collect();
        assert_eq!(ys, vec![100, 150, 200, 250]);
    }

    #[test]
    fn test_empty_keyword_skipped() {
        let records = vec![
            record("a", "Alpha", "a"),
            record("b", "Bravo", ""),
            record("c", "Charlie", "c"),
        ];

        let mut doc = doc();
        let report = Regenerator::default().regenerate(&mut doc, &records, None);

        assert_eq!(report.emitted, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(report.skipped, vec!["b".to_string()]);
        assert!(doc.node("b").is_none());
        assert_eq!(ypos(&doc, "c"), 390);
        assert_eq!(report.targets.len(), 3);
    }

    #[test]
    fn test_hand_authored_content_preserved() {
        let mut doc = doc();
        Regenerator::default().regenerate(&mut doc, &[record("a", "Alpha", "a")], None);

        let manual = doc.node("MANUAL").unwrap();
        assert!(!doc.is_generated(manual));
        assert_eq!(doc.uidata["MANUAL"].xpos, Some(Coordinate::Real(40.5)));
        assert!(doc.connections.contains_key("MANUAL"));
        assert_eq!(
            doc.extra.get("name").and_then(|v| v.as_string()),
            Some("Searchio!")
        );
        assert_eq!(doc.objects.len(), 3);
    }

    #[test]
    fn test_uid_collision_with_hand_authored_node() {
        let mut doc = doc();
        let report = Regenerator::default().regenerate(
            &mut doc,
            &[record("MANUAL", "Manual", "m"), record("b", "Bravo", "b")],
            None,
        );

        assert_eq!(report.skipped, vec!["MANUAL".to_string()]);
        assert_eq!(report.emitted, vec!["b".to_string()]);
        assert_eq!(doc.node("MANUAL").unwrap().config_str("keyword"), Some("manual"));
    }

    #[test]
    fn test_only_restricts_targets() {
        let records = vec![record("a", "Alpha", "a"), record("b", "Bravo", "b")];
        let regenerator = Regenerator::default();

        let mut doc = doc();
        regenerator.regenerate(&mut doc, &records, None);

        let only = HashSet::from(["b".to_string()]);
        let report = regenerator.regenerate(&mut doc, &records, Some(&only));

        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.emitted, vec!["b".to_string()]);
        assert_eq!(doc.generated_uids(), vec!["b".to_string()]);
    }

    #[test]
    fn test_injected_order() {
        fn by_keyword(a: &SearchRecord, b: &SearchRecord) -> std::cmp::Ordering {
            a.keyword.cmp(&b.keyword)
        }

        let records = vec![record("a", "Alpha", "z"), record("b", "Bravo", "m")];
        let mut doc = WorkflowDocument::default();
        let report = Regenerator::default()
            .with_order(by_keyword)
            .regenerate(&mut doc, &records, None);

        assert_eq!(report.emitted, vec!["b", "a"]);
        assert_eq!(ypos(&doc, "b"), 220);
    }

    #[test]
    fn test_custom_search_command_and_sink() {
        let regenerator = Regenerator::new(LayoutConfig::default(), "SINK", "/usr/local/bin/searchio-search");
        let mut doc = WorkflowDocument::default();
        regenerator.regenerate(&mut doc, &[record("a", "Alpha", "a")], None);

        assert_eq!(
            doc.node("a").unwrap().config_str("script"),
            Some("/usr/local/bin/searchio-search a \"$1\"")
        );
        assert_eq!(doc.connections["a"][0].destinationuid, "SINK");
    }
}
