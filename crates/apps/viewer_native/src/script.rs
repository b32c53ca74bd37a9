use std::fs;
use std::path::Path;
use std::time::Duration;

use epochs::{EpochTable, SliderRange};

/// Default pause after each slider move.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(600);

/// One simulated slider input.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    /// Raw control value before quantization.
    pub value: f64,
    /// How long to keep rendering before the next input.
    pub wait: Duration,
}

/// A recorded slider session.
///
/// Text form, one step per line: `<value> [wait_ms]`. Blank lines and `#`
/// comments are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut steps = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let value = parts
                .next()
                .unwrap_or_default()
                .parse::<f64>()
                .map_err(|e| format!("line {}: bad slider value: {e}", n + 1))?;
            let wait = match parts.next() {
                Some(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .map_err(|e| format!("line {}: bad wait: {e}", n + 1))?,
                ),
                None => DEFAULT_WAIT,
            };
            if let Some(extra) = parts.next() {
                return Err(format!("line {}: unexpected token '{extra}'", n + 1));
            }
            steps.push(ScriptStep { value, wait });
        }
        Ok(Self { steps })
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
        Self::parse(&text)
    }

    /// Visit every epoch inside the slider range in ascending order, then
    /// return to the start.
    pub fn sweep(table: &EpochTable, slider: &SliderRange, wait: Duration) -> Self {
        let mut steps: Vec<ScriptStep> = table
            .sorted_ages()
            .iter()
            .filter(|a| slider.contains(**a))
            .map(|a| ScriptStep {
                value: f64::from(a.ma()),
                wait,
            })
            .collect();
        steps.push(ScriptStep {
            value: f64::from(slider.min().ma()),
            wait,
        });
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_WAIT, Script, ScriptStep};
    use epochs::{EpochTable, SliderRange};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn parses_values_waits_and_comments() {
        let s = Script::parse("# sweep\n0\n50 100\n\n 260.4   20 # pangaea\n").expect("parse");
        assert_eq!(
            s.steps,
            vec![
                ScriptStep {
                    value: 0.0,
                    wait: DEFAULT_WAIT
                },
                ScriptStep {
                    value: 50.0,
                    wait: Duration::from_millis(100)
                },
                ScriptStep {
                    value: 260.4,
                    wait: Duration::from_millis(20)
                },
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = Script::parse("0\nabc\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
        let err = Script::parse("0 10 extra").unwrap_err();
        assert!(err.contains("unexpected token 'extra'"), "{err}");
    }

    #[test]
    fn sweep_visits_epochs_in_range() {
        let t = EpochTable::from_pairs([(250, "p"), (0, "m"), (-100, "f"), (100, "j")])
            .expect("table");
        let s = Script::sweep(&t, &SliderRange::phanerozoic(), Duration::from_millis(1));
        let values: Vec<f64> = s.steps.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.0, 100.0, 250.0, 0.0]);
    }
}
