use crate::init_test_subscriber;
use crate::ir::Attr;
use crate::ir::AttributeRegistry;
use crate::AttrError;
use std::panic::Location;
use tracing::info;

pub struct Tester;

impl Tester {
    /// Initialize the subscriber for the tests.
    ///
    /// Cannot pass options, since the tests run concurrently.
    pub fn init_tracing() {
        let level = tracing::Level::INFO;
        match init_test_subscriber(level) {
            Ok(_) => (),
            Err(_e) => (),
        }
    }
    fn point_to_missing_line(expected: &str, index: usize) -> String {
        let mut result = String::from("A line is missing from the output:\n```");
        for (i, line) in expected.lines().enumerate() {
            result.push('\n');
            result.push_str(line);
            if i == index {
                result.push_str("   <== missing");
            }
        }
        result.push_str("\n```");
        result
    }
    /// Check that both texts have the same lines (ignoring surrounding whitespace).
    pub fn check_lines_exact(actual: &str, expected: &str, caller: &Location<'_>) {
        let actual = actual.trim().lines().collect::<Vec<&str>>();
        let expected = expected.trim().lines().collect::<Vec<&str>>();
        for i in 0..actual.len().max(expected.len()) {
            match (actual.get(i), expected.get(i)) {
                (Some(actual_line), Some(expected_line)) => {
                    assert_eq!(actual_line, expected_line, "called from {caller}");
                }
                _ => panic!("Line {i} is only present in one of the texts: called from {caller}"),
            }
        }
    }
    /// Check whether the expected lines are present in the actual output.
    ///
    /// The actual output may contain additional lines that are not in the expected output.
    pub fn check_lines_contain(actual: &str, expected: &str, caller: &Location<'_>) {
        let actual = actual.trim().lines().collect::<Vec<&str>>();
        let mut actual_index = 0;
        for (i, expected_line) in expected.trim().lines().enumerate() {
            let expected_line = expected_line.trim();
            // If not skipping these, an empty line will match any line (which
            // can then cause the next expected line to be reported as missing).
            if expected_line.is_empty() {
                continue;
            }
            let found = actual[actual_index..]
                .iter()
                .position(|line| line.contains(expected_line));
            match found {
                Some(offset) => actual_index += offset + 1,
                None => {
                    let msg = Self::point_to_missing_line(expected.trim(), i);
                    panic!("{msg}\nwhen called from {caller}");
                }
            }
        }
    }
    fn print_heading(msg: &str, src: &str) {
        info!("{msg}:\n```\n{src}\n```\n");
    }
    /// Parse `src` with the default registry and print it again.
    pub fn parse(src: &str) -> (Attr, String) {
        let src = src.trim();
        Self::print_heading("Before parse", src);
        let registry = AttributeRegistry::default();
        let attr = match registry.parse(src) {
            Ok(attr) => attr,
            Err(e) => panic!("{}", e.render(src)),
        };
        let actual = registry.print(&attr).unwrap();
        Self::print_heading("After parse", &actual);
        (attr, actual)
    }
    /// Parse `src` and return the error, panicking if parsing succeeds.
    pub fn parse_err(src: &str) -> AttrError {
        let src = src.trim();
        match AttributeRegistry::default().parse(src) {
            Ok(attr) => panic!("Expected an error, but parsed {attr}"),
            Err(e) => {
                Self::print_heading("Error", &e.render(src));
                e
            }
        }
    }
    /// Print `attr`, parse the result, and check that the value survived.
    ///
    /// Returns the printed text.
    pub fn round_trip(attr: &Attr) -> String {
        let registry = AttributeRegistry::default();
        let printed = registry.print(attr).unwrap();
        Self::print_heading("Printed", &printed);
        let parsed = match registry.parse(&printed) {
            Ok(parsed) => parsed,
            Err(e) => panic!("{}", e.render(&printed)),
        };
        assert_eq!(&parsed, attr);
        assert_eq!(registry.print(&parsed).unwrap(), printed);
        printed
    }
}
