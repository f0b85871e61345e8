//! Output Envelope
//!
//! Normalizes heterogeneous plugin results into uniform `{type, output}`
//! records, the unit consumed by reporting. The type tag is an open,
//! stringly-tagged union: new plugin variants may introduce new tags, so
//! the reporter treats exhaustiveness as best-effort.

use crate::command::ExecutionResult;
use crate::core::abort::AbortKind;
use crate::resource::Resource;
use serde_json::json;

/// Known envelope type tags
///
/// Not a closed enum; constants exist for the tags this crate emits itself.
pub mod kind {
    pub const COMMAND_DUMP: &str = "CommandDump";
    pub const RESOURCE_LINK_LIST: &str = "ResourceLinkList";
    pub const TABBED_RESOURCE_LINK_LIST: &str = "TabbedResourceLinkList";
    pub const URLS_FROM_STR: &str = "URLsFromStr";
    pub const TRANSACTION_TABLE_FROM_IDS: &str = "TransactionTableFromIDs";
    pub const TRANSACTION_TABLE_FOR_URL_LIST: &str = "TransactionTableForURLList";
    pub const RESPONSE_HEADER_MATCHES: &str = "ResponseHeaderMatches";
    pub const RESPONSE_BODY_MATCHES: &str = "ResponseBodyMatches";
    pub const SUGGESTED_COMMAND_BOX: &str = "SuggestedCommandBox";
    pub const HTML_STRING: &str = "HtmlString";
    pub const FINGERPRINT_DATA: &str = "FingerprintData";
}

/// One normalized result record
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub output: serde_json::Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            output,
        }
    }

    pub fn command_dump(result: &ExecutionResult, relative_file_path: &str) -> Self {
        Self::new(
            kind::COMMAND_DUMP,
            json!({
                "ModifiedCommand": result.modified_command,
                "RelativeFilePath": relative_file_path,
                "RawOutput": result.raw_output,
                "ElapsedTime": result.elapsed.as_secs_f64(),
                "ExitStatus": result.exit_status,
            }),
        )
    }

    pub fn urls_from_str(result: &ExecutionResult, urls: &[String], visited: bool) -> Self {
        Self::new(
            kind::URLS_FROM_STR,
            json!({
                "ModifiedCommand": result.modified_command,
                "URLList": urls,
                "Visited": visited,
                "ElapsedTime": result.elapsed.as_secs_f64(),
            }),
        )
    }

    pub fn resource_link_list(list_name: &str, links: &[Resource]) -> Self {
        let links: Vec<_> = links
            .iter()
            .map(|r| json!({"Name": r.display_name, "URL": r.command_template}))
            .collect();
        Self::new(
            kind::RESOURCE_LINK_LIST,
            json!({"ResourceListName": list_name, "Links": links}),
        )
    }

    pub fn tabbed_resource_link_list(tabs: &[(String, Vec<Resource>)]) -> Self {
        let tabs: Vec<_> = tabs
            .iter()
            .map(|(tab_name, links)| {
                let links: Vec<_> = links
                    .iter()
                    .map(|r| json!({"Name": r.display_name, "URL": r.command_template}))
                    .collect();
                json!({"TabName": tab_name, "Links": links})
            })
            .collect();
        Self::new(kind::TABBED_RESOURCE_LINK_LIST, json!({"Tabs": tabs}))
    }

    pub fn suggested_command_box(header: &str, categories: &[(String, String)]) -> Self {
        let categories: Vec<_> = categories
            .iter()
            .map(|(category, resource)| json!({"CategoryName": category, "Resource": resource}))
            .collect();
        Self::new(
            kind::SUGGESTED_COMMAND_BOX,
            json!({"Header": header, "Categories": categories}),
        )
    }

    /// References transaction identifiers only; the reporter fetches bodies lazily
    pub fn transaction_table_from_ids(ids: &[u64]) -> Self {
        Self::new(
            kind::TRANSACTION_TABLE_FROM_IDS,
            json!({"TransactionIDs": ids}),
        )
    }

    /// Describes the fetch parameters, not the response bodies
    pub fn transaction_table_for_url_list(
        url_types: &[String],
        use_cache: bool,
        method: &str,
        data: Option<&str>,
    ) -> Self {
        Self::new(
            kind::TRANSACTION_TABLE_FOR_URL_LIST,
            json!({
                "URLTypes": url_types,
                "UseCache": use_cache,
                "Method": method,
                "Data": data,
            }),
        )
    }

    pub fn response_matches(
        header_not_body: bool,
        pattern_name: &str,
        pattern: &str,
        matches: &[(u64, String)],
    ) -> Self {
        let tag = if header_not_body {
            kind::RESPONSE_HEADER_MATCHES
        } else {
            kind::RESPONSE_BODY_MATCHES
        };
        let matches: Vec<_> = matches
            .iter()
            .map(|(id, text)| json!({"TransactionID": id, "Match": text}))
            .collect();
        Self::new(
            tag,
            json!({"PatternName": pattern_name, "Pattern": pattern, "Matches": matches}),
        )
    }

    pub fn html_string(text: &str) -> Self {
        Self::new(kind::HTML_STRING, json!({"String": text}))
    }
}

/// Terminal state of one plugin run
///
/// Aborts carry the envelopes produced before the interruption; absent
/// previous output concatenates as the empty sequence, so the partial list
/// is always well-formed even when the very first command was interrupted.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Vec<Envelope>),
    Aborted {
        kind: AbortKind,
        partial: Vec<Envelope>,
    },
}

impl RunOutcome {
    pub fn envelopes(&self) -> &[Envelope] {
        match self {
            RunOutcome::Completed(envelopes) => envelopes,
            RunOutcome::Aborted { partial, .. } => partial,
        }
    }

    pub fn into_envelopes(self) -> Vec<Envelope> {
        match self {
            RunOutcome::Completed(envelopes) => envelopes,
            RunOutcome::Aborted { partial, .. } => partial,
        }
    }

    pub fn aborted_kind(&self) -> Option<AbortKind> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Aborted { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::AbortedBy;
    use std::time::Duration;

    fn result(command: &str, output: &str) -> ExecutionResult {
        ExecutionResult {
            modified_command: command.to_string(),
            raw_output: output.to_string(),
            elapsed: Duration::from_millis(120),
            aborted_by: AbortedBy::None,
            exit_status: Some(0),
        }
    }

    #[test]
    fn test_command_dump_payload() {
        let envelope = Envelope::command_dump(&result("nmap -p 80 x.test", "open"), "Scan/active/Port_scan.txt");
        assert_eq!(envelope.kind, kind::COMMAND_DUMP);
        assert_eq!(envelope.output["ModifiedCommand"], "nmap -p 80 x.test");
        assert_eq!(envelope.output["RelativeFilePath"], "Scan/active/Port_scan.txt");
        assert_eq!(envelope.output["RawOutput"], "open");
    }

    #[test]
    fn test_urls_from_str_payload() {
        let urls = vec!["http://a.test".to_string(), "http://b.test".to_string()];
        let envelope = Envelope::urls_from_str(&result("cat urls", "x"), &urls, false);
        assert_eq!(envelope.kind, kind::URLS_FROM_STR);
        assert_eq!(
            envelope.output["URLList"],
            serde_json::json!(["http://a.test", "http://b.test"])
        );
    }

    #[test]
    fn test_tabbed_list_preserves_order() {
        let tabs = vec![
            ("TabA".to_string(), vec![Resource::new("A", "http://a")]),
            ("TabB".to_string(), vec![Resource::new("B", "http://b")]),
        ];
        let envelope = Envelope::tabbed_resource_link_list(&tabs);
        let tabs = envelope.output["Tabs"].as_array().unwrap();
        assert_eq!(tabs[0]["TabName"], "TabA");
        assert_eq!(tabs[1]["TabName"], "TabB");
    }

    #[test]
    fn test_serialized_tag_is_named_type() {
        let envelope = Envelope::html_string("hello");
        let raw = serde_json::to_string(&envelope).unwrap();
        assert!(raw.contains("\"type\":\"HtmlString\""));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = RunOutcome::Aborted {
            kind: AbortKind::Plugin,
            partial: vec![Envelope::html_string("p")],
        };
        assert_eq!(outcome.aborted_kind(), Some(AbortKind::Plugin));
        assert_eq!(outcome.envelopes().len(), 1);
    }
}
