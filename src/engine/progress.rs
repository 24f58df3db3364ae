// Reader for ffmpeg's `-progress` output during the normalise pass

use std::time::Duration;

/// Latest snapshot from ffmpeg's `-progress` key=value blocks
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    /// Position of the encoded audio, microseconds
    pub out_time_us: u64,
    /// Encoding speed relative to realtime
    pub speed: Option<f64>,
    pub is_complete: bool,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of stdout. Returns true when the line closes a block
    /// (`progress=continue` or `progress=end`) and a snapshot is ready.
    pub fn parse_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.split_once('=') else {
            return false;
        };
        let value = value.trim();

        match key.trim() {
            // "N/A" until the first packet is muxed
            "out_time_us" => {
                if let Ok(us) = value.parse() {
                    self.out_time_us = us;
                }
            }
            "speed" => {
                if let Some(speed) = value
                    .strip_suffix('x')
                    .and_then(|v| v.trim().parse().ok())
                {
                    self.speed = Some(speed);
                }
            }
            "progress" => {
                self.is_complete = value == "end";
                return true;
            }
            _ => {}
        }
        false
    }

    pub fn position(&self) -> Duration {
        Duration::from_micros(self.out_time_us)
    }

    /// Percentage through a recording of `duration_s` seconds; 100 once ffmpeg reports the end
    pub fn progress_pct(&self, duration_s: Option<f64>) -> f64 {
        match duration_s {
            _ if self.is_complete => 100.0,
            Some(total) if total > 0.0 => {
                (self.position().as_secs_f64() / total * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_end_reported() {
        let mut parser = ProgressParser::new();

        assert!(!parser.parse_line("out_time_us=5000000"));
        assert!(!parser.parse_line("total_size=1024000"));
        assert!(!parser.parse_line("speed=41.5x"));
        assert_eq!(parser.position(), Duration::from_secs(5));
        assert_eq!(parser.speed, Some(41.5));

        assert!(parser.parse_line("progress=continue"));
        assert!(!parser.is_complete);
        assert!(parser.parse_line("progress=end"));
        assert!(parser.is_complete);
    }

    #[test]
    fn test_placeholder_values_ignored() {
        let mut parser = ProgressParser::new();
        parser.parse_line("out_time_us=2000000");
        parser.parse_line("speed= 3.2x");
        parser.parse_line("out_time_us=N/A");
        parser.parse_line("speed=N/A");
        assert!(!parser.parse_line("garbage line"));
        assert_eq!(parser.out_time_us, 2_000_000);
        assert_eq!(parser.speed, Some(3.2));
    }

    #[test]
    fn test_progress_percentage() {
        let mut parser = ProgressParser::new();
        parser.parse_line("out_time_us=30000000");

        assert_eq!(parser.progress_pct(Some(120.0)), 25.0);
        assert_eq!(parser.progress_pct(Some(10.0)), 100.0);
        assert_eq!(parser.progress_pct(None), 0.0);
        assert_eq!(parser.progress_pct(Some(0.0)), 0.0);

        parser.parse_line("progress=end");
        assert_eq!(parser.progress_pct(None), 100.0);
    }
}
