//! Full parameter set of a data set.
//!
//! The `parameters` table only lists the values a user wants to change; every
//! parameter not listed takes its default.

use crate::input::{ParamValue, ParameterRow};

pub const NUMBER_OF_CENTROIDS: &str = "Number of Centroids";
pub const MIP_GAP: &str = "MIP Gap";
pub const FORMULATION: &str = "Formulation";
pub const THREADING: &str = "Threading";
pub const LOG_TO_CONSOLE: &str = "Log To Console";
pub const TIME_LIMIT: &str = "Time Limit";

pub const KNOWN_PARAMETERS: [&str; 6] = [
    NUMBER_OF_CENTROIDS,
    MIP_GAP,
    FORMULATION,
    THREADING,
    LOG_TO_CONSOLE,
    TIME_LIMIT,
];

/// Linking between assignment and opening variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    /// One aggregated big-M row per candidate center
    Weak,
    /// One `x <= y` row per assignment variable
    Strong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub number_of_centroids: usize,
    pub mip_gap: f64,
    pub formulation: Formulation,
    pub threading: bool,
    pub log_to_console: bool,
    /// Seconds, `None` when unlimited
    pub time_limit: Option<f64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            number_of_centroids: 1,
            mip_gap: 0.001,
            formulation: Formulation::Strong,
            threading: true,
            log_to_console: true,
            time_limit: None,
        }
    }
}

impl Parameters {
    /// Apply the parameter rows on top of the defaults.
    ///
    /// Every problem is reported, not only the first one.
    pub fn from_rows(rows: &[ParameterRow]) -> Result<Self, Vec<String>> {
        let mut params = Parameters::default();
        let mut errors = Vec::new();

        for row in rows {
            if let Err(e) = params.apply(&row.parameter, &row.value) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(params)
        } else {
            Err(errors)
        }
    }

    fn apply(&mut self, name: &str, value: &ParamValue) -> Result<(), String> {
        match name {
            NUMBER_OF_CENTROIDS => {
                self.number_of_centroids = positive_integer(name, value)?;
            }
            MIP_GAP => {
                let gap = number(name, value)?;
                if !(gap > 0.0 && gap.is_finite()) {
                    return Err(format!("{} must be a positive finite number, got {}", name, value));
                }
                self.mip_gap = gap;
            }
            FORMULATION => {
                self.formulation = match text(name, value)? {
                    "Weak" => Formulation::Weak,
                    "Strong" => Formulation::Strong,
                    other => return Err(format!("{} must be Weak or Strong, got {}", name, other)),
                };
            }
            THREADING => {
                self.threading = match text(name, value)? {
                    "Enabled" => true,
                    "Disabled" => false,
                    other => {
                        return Err(format!("{} must be Enabled or Disabled, got {}", name, other))
                    }
                };
            }
            LOG_TO_CONSOLE => {
                let flag = number(name, value)?;
                self.log_to_console = match flag {
                    f if f == 0.0 => false,
                    f if f == 1.0 => true,
                    _ => return Err(format!("{} must be 0 or 1, got {}", name, value)),
                };
            }
            TIME_LIMIT => {
                let limit = number(name, value)?;
                if !(limit > 0.0) {
                    return Err(format!("{} must be positive, got {}", name, value));
                }
                self.time_limit = limit.is_finite().then_some(limit);
            }
            _ => return Err(format!("Unknown parameter {:?}", name)),
        }
        Ok(())
    }
}

fn number(name: &str, value: &ParamValue) -> Result<f64, String> {
    value
        .as_number()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| format!("{} must be a number, got {}", name, value))
}

fn text<'a>(name: &str, value: &'a ParamValue) -> Result<&'a str, String> {
    value
        .as_text()
        .ok_or_else(|| format!("{} must be a string, got {}", name, value))
}

/// Integer strictly greater than zero
pub(crate) fn positive_integer(name: &str, value: &ParamValue) -> Result<usize, String> {
    let v = number(name, value)?;
    if v.fract() != 0.0 || v < 1.0 || !v.is_finite() {
        return Err(format!("{} must be a positive integer, got {}", name, value));
    }
    Ok(v as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: ParamValue) -> ParameterRow {
        ParameterRow { parameter: name.to_string(), value }
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let params = Parameters::from_rows(&[]).unwrap();
        assert_eq!(params, Parameters::default());
        assert_eq!(params.number_of_centroids, 1);
        assert_eq!(params.formulation, Formulation::Strong);
        assert!(params.threading);
    }

    #[test]
    fn test_rows_override_defaults() {
        let rows = vec![
            row(NUMBER_OF_CENTROIDS, ParamValue::Number(3.0)),
            row(MIP_GAP, ParamValue::Text("0.05".to_string())),
            row(FORMULATION, ParamValue::Text("Weak".to_string())),
            row(THREADING, ParamValue::Text("Disabled".to_string())),
            row(LOG_TO_CONSOLE, ParamValue::Number(0.0)),
            row(TIME_LIMIT, ParamValue::Number(30.0)),
        ];
        let params = Parameters::from_rows(&rows).unwrap();
        assert_eq!(params.number_of_centroids, 3);
        assert_eq!(params.mip_gap, 0.05);
        assert_eq!(params.formulation, Formulation::Weak);
        assert!(!params.threading);
        assert!(!params.log_to_console);
        assert_eq!(params.time_limit, Some(30.0));
    }

    #[test]
    fn test_all_bad_rows_reported() {
        let rows = vec![
            row(NUMBER_OF_CENTROIDS, ParamValue::Number(2.5)),
            row(MIP_GAP, ParamValue::Number(0.0)),
            row(FORMULATION, ParamValue::Text("Medium".to_string())),
            row("Colour", ParamValue::Text("Blue".to_string())),
        ];
        let errors = Parameters::from_rows(&rows).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[3].contains("Unknown parameter"));
    }

    #[test]
    fn test_number_of_centroids_must_be_positive() {
        let zero = ParamValue::Number(0.0);
        assert!(positive_integer(NUMBER_OF_CENTROIDS, &zero).is_err());
        let text = ParamValue::Text("four".to_string());
        assert!(positive_integer(NUMBER_OF_CENTROIDS, &text).is_err());
        assert_eq!(positive_integer(NUMBER_OF_CENTROIDS, &ParamValue::Number(4.0)), Ok(4));
    }
}
