use crate::domain::{CallTrace, ErrorKind};
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// Universal result value for every internal operation.
///
/// Collaborators produce one at the bottom of a call chain, procedures
/// thread it upward (adding trace entries and, when missing, a
/// classification), and the HTTP renderer consumes it exactly once.
/// Outcomes are request-scoped and never shared across requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    ok: bool,
    content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    short: Option<ErrorKind>,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
    calls: CallTrace,
    #[serde(skip)]
    success_status: u16,
    #[serde(skip)]
    page: Option<PageInfo>,
}

/// Page-cursor fields attached to a listing outcome before rendering. The
/// paginated renderer turns these into `Link`, `Query-Total` and
/// `Query-Limit` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl PageInfo {
    pub fn last_page(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }

        (self.total.div_ceil(self.limit)).max(1)
    }
}

impl Outcome {
    /// An outcome never reports `ok == true` unless built through one of the
    /// success constructors.
    pub fn success(content: Value) -> Self {
        Self {
            ok: true,
            content,
            short: None,
            message: String::new(),
            calls: CallTrace::new(),
            success_status: 200,
            page: None,
        }
    }

    pub fn success_with_status(content: Value, status: u16) -> Self {
        let mut outcome = Self::success(content);
        outcome.success_status = status;
        outcome
    }

    /// Builder start for the failure path; details are attached through the
    /// chained `with_*` calls.
    pub fn failure() -> Self {
        Self {
            ok: false,
            content: Value::Null,
            short: None,
            message: String::new(),
            calls: CallTrace::new(),
            success_status: 200,
            page: None,
        }
    }

    /// Attaches the failure payload (or success payload replacement). Does
    /// not alter `ok`. Content need not be an object; a plain string is a
    /// legal failure description.
    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    /// First write wins: once a classification is set it is immutable, so an
    /// outer layer can supply a kind the inner layer omitted but can never
    /// mask a more specific inner one.
    pub fn with_short(mut self, kind: ErrorKind) -> Self {
        if self.short.is_none() {
            self.short = Some(kind);
        }
        self
    }

    /// Same first-write-wins policy, for kinds that arrive as strings from
    /// collaborator payloads. Unrecognized kinds are ignored.
    pub fn with_short_str(self, kind: &str) -> Self {
        match ErrorKind::from_str(kind) {
            Ok(kind) => self.with_short(kind),
            Err(_) => self,
        }
    }

    /// Unlike `short`, the free-form message is last-write-wins.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// Replaces the call trace with one accumulated externally by a
    /// procedure's pipeline.
    pub fn with_trace(mut self, trace: CallTrace) -> Self {
        self.calls = trace;
        self
    }

    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.page = Some(page);
        self
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn into_content(self) -> Value {
        self.content
    }

    pub fn short(&self) -> Option<ErrorKind> {
        self.short
    }

    /// Classification carried by a nested Outcome-shaped failure payload,
    /// used by the renderer when the outcome itself was never tagged.
    pub fn nested_short(&self) -> Option<ErrorKind> {
        if self.ok {
            return None;
        }

        self.content
            .get("short")
            .and_then(Value::as_str)
            .and_then(|kind| ErrorKind::from_str(kind).ok())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &CallTrace {
        &self.calls
    }

    pub fn success_status(&self) -> u16 {
        self.success_status
    }

    pub fn page(&self) -> Option<PageInfo> {
        self.page
    }

    /// Compact representation recorded into call traces: what the operation
    /// returned, without dragging the nested trace along.
    pub fn log_value(&self) -> Value {
        let mut value = json!({
            "ok": self.ok,
            "content": self.content,
        });

        if let Some(short) = self.short {
            value["short"] = json!(short.to_string());
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_short_and_defaults_to_200() {
        let outcome = Outcome::success(json!({"name": "hello"}));

        assert!(outcome.ok());
        assert_eq!(outcome.short(), None);
        assert_eq!(outcome.success_status(), 200);
        assert_eq!(outcome.content(), &json!({"name": "hello"}));
    }

    #[test]
    fn short_is_first_write_wins() {
        let outcome = Outcome::failure()
            .with_short(ErrorKind::Unauthorized)
            .with_short(ErrorKind::NotFound);

        assert_eq!(outcome.short(), Some(ErrorKind::Unauthorized));
    }

    #[test]
    fn unknown_kind_string_is_rejected() {
        let untouched = Outcome::failure().with_short_str("not_a_real_kind");
        assert_eq!(untouched.short(), None);

        let kept = Outcome::failure()
            .with_short(ErrorKind::BadRepo)
            .with_short_str("not_a_real_kind");
        assert_eq!(kept.short(), Some(ErrorKind::BadRepo));
    }

    #[test]
    fn known_kind_string_is_applied_once() {
        let outcome = Outcome::failure()
            .with_short_str("not_found")
            .with_short_str("server_error");

        assert_eq!(outcome.short(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn message_is_last_write_wins() {
        let outcome = Outcome::failure()
            .with_message("first")
            .with_message("second");

        assert_eq!(outcome.message(), "second");
    }

    #[test]
    fn failure_content_may_be_a_plain_string() {
        let outcome = Outcome::failure().with_content(json!("missing token"));

        assert!(!outcome.ok());
        assert_eq!(outcome.content(), &json!("missing token"));
    }

    #[test]
    fn nested_short_is_read_from_outcome_shaped_content() {
        let inner = Outcome::failure().with_short(ErrorKind::BadRepo);
        let outer = Outcome::failure().with_content(inner.log_value());

        assert_eq!(outer.short(), None);
        assert_eq!(outer.nested_short(), Some(ErrorKind::BadRepo));
    }

    #[test]
    fn nested_short_ignores_unrecognized_kinds() {
        let outer = Outcome::failure().with_content(json!({"short": "bogus"}));
        assert_eq!(outer.nested_short(), None);
    }

    #[test]
    fn last_page_rounds_up() {
        let page = PageInfo {
            page: 1,
            limit: 30,
            total: 61,
        };
        assert_eq!(page.last_page(), 3);

        let empty = PageInfo {
            page: 1,
            limit: 30,
            total: 0,
        };
        assert_eq!(empty.last_page(), 1);
    }
}
