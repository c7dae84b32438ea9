//! Tests observing the advisory diagnostics emitted through `tracing`

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use formcheck::rules::required;
use formcheck::{validate_form, validate_nested_form, Catalog, RuleSet, ValidationContext};
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

/// Shared buffer the subscriber writes formatted events into.
#[derive(Clone, Default)]
struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a capturing subscriber installed and return the log output.
fn capture_warnings(f: impl FnOnce()) -> String {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

#[test]
fn extra_field_advisory_names_the_field() {
    let rules = RuleSet::new().field("known", vec![required()]);
    let values = json!({"known": "x", "surprise": "y"});

    let output = capture_warnings(|| {
        // Advisory only: the result is unaffected.
        assert!(validate_form(&values, &rules, &ValidationContext::new())
            .unwrap()
            .is_none());
    });
    assert!(output.contains("field has no validation rules"), "{output}");
    assert!(output.contains("surprise"), "{output}");
    assert!(!output.contains("known"), "{output}");
}

#[test]
fn nested_extra_field_advisory_uses_the_dotted_path() {
    let rules = RuleSet::new().nested("address", RuleSet::new().field("city", vec![required()]));
    let values = json!({"address": {"city": "Porto", "planet": "Earth"}});

    let output = capture_warnings(|| {
        assert!(validate_nested_form(&values, &rules, &ValidationContext::new())
            .unwrap()
            .is_none());
    });
    assert!(output.contains("address.planet"), "{output}");
}

#[test]
fn covered_fields_produce_no_advisory() {
    let rules = RuleSet::new().field("known", vec![required()]);
    let values = json!({"known": "x"});

    let output = capture_warnings(|| {
        assert!(validate_form(&values, &rules, &ValidationContext::new())
            .unwrap()
            .is_none());
    });
    assert!(output.is_empty(), "{output}");
}

#[test]
fn unknown_locale_warns_and_keeps_the_previous_default() {
    let output = capture_warnings(|| {
        let mut catalog = Catalog::new();
        catalog.set_locale("xx");
        assert_eq!(catalog.default_locale(), "en");
    });
    assert!(output.contains("unknown locale"), "{output}");
    assert!(output.contains("xx"), "{output}");
}
