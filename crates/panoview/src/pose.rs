//! Orientation samples read from stdin.
//!
//! Stands in for a headset or device-tilt driver: each line is parsed and
//! pushed into the matching sensor's [`SampleFeed`]. Malformed lines are
//! logged and skipped.

use std::io::BufRead;
use std::thread;

use anyhow::{bail, Context, Result};
use glam::Quat;
use panoview_stereo::{DeviceAngles, SampleFeed};

/// Parses `x y z w`.
pub fn parse_quat(line: &str) -> Result<Quat> {
    let v = parse_floats(line)?;
    let [x, y, z, w] = v[..] else {
        bail!("expected 4 values (x y z w), got {}", v.len());
    };
    Ok(Quat::from_xyzw(x, y, z, w))
}

/// Parses `alpha beta gamma [screen]` in degrees; `screen` defaults to 0.
pub fn parse_angles(line: &str) -> Result<DeviceAngles> {
    let v = parse_floats(line)?;
    let (alpha, beta, gamma, screen) = match v[..] {
        [a, b, g] => (a, b, g, 0.0),
        [a, b, g, s] => (a, b, g, s),
        _ => bail!("expected 3 or 4 values (alpha beta gamma [screen]), got {}", v.len()),
    };
    Ok(DeviceAngles { alpha, beta, gamma, screen })
}

fn parse_floats(line: &str) -> Result<Vec<f32>> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let v = t.parse::<f32>().with_context(|| format!("invalid number '{t}'"))?;
            if !v.is_finite() {
                bail!("non-finite value '{t}'");
            }
            Ok(v)
        })
        .collect()
}

/// Spawns a thread feeding parsed stdin lines into `feed` until EOF.
///
/// When the thread ends the feed is dropped and the sensor reports no
/// orientation from then on.
pub fn spawn_stdin_feed<T, F>(feed: SampleFeed<T>, parse: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(&str) -> Result<T> + Send + 'static,
{
    thread::Builder::new()
        .name("panoview-pose".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for (n, line) in stdin.lock().lines().enumerate() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        log::warn!("pose input: read failed: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse(&line) {
                    Ok(sample) => feed.push(sample),
                    Err(e) => log::warn!("pose input line {}: {e:#}", n + 1),
                }
            }
            log::info!("pose input closed");
        })
        .context("failed to spawn pose input thread")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quat_lines() {
        let q = parse_quat("0 0.7071 0 0.7071").unwrap();
        assert_eq!(q, Quat::from_xyzw(0.0, 0.7071, 0.0, 0.7071));
        assert!(parse_quat("1,0,0,0").is_ok());
        assert!(parse_quat("0 0 1").is_err());
        assert!(parse_quat("0 0 1 w").is_err());
    }

    #[test]
    fn angle_lines() {
        let a = parse_angles("30 80 5").unwrap();
        assert_eq!((a.alpha, a.beta, a.gamma, a.screen), (30.0, 80.0, 5.0, 0.0));

        let a = parse_angles(" 30  80  5  90 ").unwrap();
        assert_eq!(a.screen, 90.0);

        assert!(parse_angles("30 80").is_err());
        assert!(parse_angles("1 2 3 4 5").is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(parse_angles("nan 90 0").is_err());
        assert!(parse_quat("0 0 inf 1").is_err());
    }
}
