//! Rendering of the final result for the result owner.

use crate::constants::NANOS_PER_SECOND;
use crate::reduce::GlobalResult;

/// Output format of the result owner's report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Two lines: the estimate with 15 decimals, then the elapsed nanoseconds
pub fn render_text(result: &GlobalResult) -> String {
    format!(
        "PI is {:.15}\nElapsed time = {:.0} nanoseconds",
        result.pi_estimate,
        result.elapsed_seconds * NANOS_PER_SECOND
    )
}

pub fn render_json(result: &GlobalResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn render(result: &GlobalResult, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => render_json(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> GlobalResult {
        GlobalResult {
            global_sum: 3_141_592.653_589_8,
            pi_estimate: std::f64::consts::PI,
            elapsed_seconds: Duration::from_nanos(1_234_567).as_secs_f64(),
            num_steps: 1_000_000,
            workers: 4,
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            render_text(&sample()),
            "PI is 3.141592653589793\nElapsed time = 1234567 nanoseconds"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["num_steps"], 1_000_000);
        assert_eq!(value["workers"], 4);
        assert!(value["pi_estimate"].as_f64().unwrap() > 3.14);
    }
}
