//! Line-oriented input form for the interactive dashboard.

use revcast::Error;
use revcast::data::{CompanyFeatures, Region};
use std::io::{self, BufRead, Write};

/// Typing this at any prompt leaves the form.
pub(crate) const QUIT: &str = "q";

/// Collects one set of company features per request.
#[derive(Debug)]
pub(crate) struct Form<R, W> {
    input: R,
    output: W,
    regions: Vec<String>,
}

impl<R: BufRead, W: Write> Form<R, W> {
    /// A form offering `regions` in its selection list.
    pub(crate) const fn new(input: R, output: W, regions: Vec<String>) -> Self {
        Self {
            input,
            output,
            regions,
        }
    }

    /// Writer the form prompts on.
    pub(crate) const fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Prompt for every field. Returns `None` when the user quits or input
    /// ends.
    ///
    /// An invalid entry is reported and the same field is asked again.
    pub(crate) fn next_request(&mut self) -> io::Result<Option<CompanyFeatures>> {
        let Some(marketing_spend) = self.field("Marketing spend", |s| parse_amount("marketing_spend", s))?
        else {
            return Ok(None);
        };
        let Some(rd_spend) = self.field("R&D spend", |s| parse_amount("rd_spend", s))? else {
            return Ok(None);
        };
        let Some(administration_costs) =
            self.field("Administration costs", |s| parse_amount("administration_costs", s))?
        else {
            return Ok(None);
        };
        let Some(employee_count) =
            self.field("Number of employees", |s| parse_count("employee_count", s))?
        else {
            return Ok(None);
        };

        let prompt = self.region_prompt();
        let regions = self.regions.clone();
        let Some(region) = self.field(&prompt, |s| resolve_region(s, &regions))? else {
            return Ok(None);
        };

        Ok(Some(CompanyFeatures::new(
            marketing_spend,
            rd_spend,
            administration_costs,
            employee_count,
            region,
        )))
    }

    fn region_prompt(&self) -> String {
        let options = self
            .regions
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}) {}", i + 1, r))
            .collect::<Vec<_>>()
            .join("  ");
        format!("Region [{options}]")
    }

    /// Ask for one field until it parses.
    fn field<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, Error>,
    ) -> io::Result<Option<T>> {
        loop {
            write!(self.output, "{prompt}: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }

            let line = line.trim();
            if line.eq_ignore_ascii_case(QUIT) {
                return Ok(None);
            }

            match parse(line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(self.output, "  {e}")?,
            }
        }
    }
}

/// Parse a non-negative monetary amount. Thousands separators are accepted.
pub(crate) fn parse_amount(field: &'static str, text: &str) -> Result<f64, Error> {
    let cleaned: String = text.trim().chars().filter(|c| !matches!(c, ',' | '_')).collect();
    if cleaned.is_empty() {
        return Err(invalid(field, "a value is required"));
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| invalid(field, format!("'{}' is not a number", text.trim())))?;
    if !value.is_finite() {
        return Err(invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(invalid(field, "must not be negative"));
    }
    Ok(value)
}

/// Parse a non-negative whole number.
pub(crate) fn parse_count(field: &'static str, text: &str) -> Result<u32, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid(field, "a value is required"));
    }
    if text.starts_with('-') {
        return Err(invalid(field, "must not be negative"));
    }
    text.parse()
        .map_err(|_| invalid(field, format!("'{text}' is not a whole number")))
}

/// Map a selection number or a typed label to a region label.
///
/// Labels matching a known region are normalized to its canonical spelling;
/// anything else is passed through for the model to accept or reject.
pub(crate) fn resolve_region(text: &str, options: &[String]) -> Result<String, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid("region", "a value is required"));
    }

    if let Ok(choice) = text.parse::<usize>() {
        return choice
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .cloned()
            .ok_or_else(|| {
                invalid(
                    "region",
                    format!("choose a number between 1 and {}", options.len()),
                )
            });
    }

    if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(text)) {
        return Ok(option.clone());
    }
    Ok(Region::from_label(text).map_or_else(|| text.to_string(), |r| r.label().to_string()))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidInput {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revcast::ErrorKind;
    use rstest::rstest;
    use std::io::Cursor;

    fn regions() -> Vec<String> {
        vec!["Asia".into(), "Europe".into(), "North America".into()]
    }

    fn form(input: &str) -> Form<Cursor<Vec<u8>>, Vec<u8>> {
        Form::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), regions())
    }

    #[rstest]
    #[case("150000", 150000.0)]
    #[case(" 1,250.50 ", 1250.5)]
    #[case("0", 0.0)]
    fn test_parse_amount(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(parse_amount("rd_spend", text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("-5")]
    #[case("abc")]
    #[case("inf")]
    #[case("NaN")]
    fn test_parse_amount_rejects(#[case] text: &str) {
        let err = parse_amount("rd_spend", text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[rstest]
    #[case("")]
    #[case("-1")]
    #[case("2.5")]
    #[case("many")]
    fn test_parse_count_rejects(#[case] text: &str) {
        assert!(parse_count("employee_count", text).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("employee_count", " 42 ").unwrap(), 42);
    }

    #[rstest]
    #[case("2", "Europe")]
    #[case("europe", "Europe")]
    #[case("NORTH AMERICA", "North America")]
    #[case("Mars", "Mars")]
    fn test_resolve_region(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(resolve_region(text, &regions()).unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("4")]
    #[case("")]
    fn test_resolve_region_rejects(#[case] text: &str) {
        assert!(resolve_region(text, &regions()).is_err());
    }

    #[test]
    fn test_full_request() {
        let mut form = form("100000\n50000\n25000\n12\n1\n");
        let features = form.next_request().unwrap().unwrap();
        assert_eq!(
            features,
            CompanyFeatures::new(100000.0, 50000.0, 25000.0, 12, "Asia")
        );
    }

    #[test]
    fn test_invalid_entry_is_asked_again() {
        let mut form = form("-10\n10\n20\n30\n\n4\nEurope\n");
        let features = form.next_request().unwrap().unwrap();
        assert_eq!(features, CompanyFeatures::new(10.0, 20.0, 30.0, 4, "Europe"));

        let transcript = String::from_utf8(form.output().clone()).unwrap();
        assert!(transcript.contains("must not be negative"));
        assert!(transcript.contains("a value is required"));
    }

    #[rstest]
    #[case("q\n")]
    #[case("1\n2\nQ\n")]
    #[case("1\n2\n")]
    fn test_quit_or_end_of_input(#[case] input: &str) {
        assert!(form(input).next_request().unwrap().is_none());
    }

    #[test]
    fn test_region_prompt_lists_options() {
        let mut form = form("1\n1\n1\n1\n3\n");
        form.next_request().unwrap();
        let transcript = String::from_utf8(form.output().clone()).unwrap();
        assert!(transcript.contains("Region [1) Asia  2) Europe  3) North America]"));
    }
}
