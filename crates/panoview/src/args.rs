use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use panoview_stereo::{EyeParameters, FieldOfView, HeadsetInfo, ProjectionMode};

/// Per-eye render target used when only `--headset-fov` is given.
pub const DEFAULT_EYE_SIZE: (u32, u32) = (1182, 1464);

/// Texture edge used when neither the CLI nor the device says otherwise.
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 8192;

#[derive(Debug, Parser)]
#[command(
    name = "panoview",
    version,
    about = "stereoscopic equirectangular panorama viewer"
)]
pub struct Args {
    /// Panorama images, shown in order; 'n' or space advances
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<PathBuf>,

    /// Source image layout
    #[arg(long, value_enum, default_value_t = ProjectionArg::Mono)]
    pub projection: ProjectionArg,

    /// Headset field of view in degrees for the left eye; the right eye is mirrored
    #[arg(long = "headset-fov", value_name = "UP,DOWN,LEFT,RIGHT", value_parser = parse_fov)]
    pub headset_fov: Option<FieldOfView>,

    /// Headset per-eye render target size
    #[arg(
        long = "headset-eye-size",
        value_name = "WxH",
        value_parser = parse_eye_size,
        requires = "headset_fov"
    )]
    pub headset_eye_size: Option<(u32, u32)>,

    /// Read orientation samples from stdin, one per line
    #[arg(long = "pose-input", value_enum, value_name = "FORMAT")]
    pub pose_input: Option<PoseFormat>,

    /// Downscale decoded images so neither edge exceeds this many pixels
    #[arg(long = "max-texture-size", value_name = "PIXELS", default_value_t = DEFAULT_MAX_TEXTURE_SIZE)]
    pub max_texture_size: u32,

    /// Log frames that take longer than 20 ms
    #[arg(long = "show-timing")]
    pub show_timing: bool,

    /// Log filter (env_logger syntax); overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum ProjectionArg {
    /// Whole image for both eyes
    Mono,
    /// Stereo pair side by side, left eye on the left
    Stereo,
}

impl From<ProjectionArg> for ProjectionMode {
    fn from(p: ProjectionArg) -> Self {
        match p {
            ProjectionArg::Mono => ProjectionMode::Mono,
            ProjectionArg::Stereo => ProjectionMode::Stereo,
        }
    }
}

/// Line format for `--pose-input`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum PoseFormat {
    /// `x y z w` headset quaternions
    Quat,
    /// `alpha beta gamma [screen]` device angles in degrees
    Angles,
}

impl Args {
    /// Display geometry of the configured headset, if any.
    pub fn headset(&self) -> Option<HeadsetInfo> {
        let fov = self.headset_fov?;
        let (w, h) = self.headset_eye_size.unwrap_or(DEFAULT_EYE_SIZE);

        let left = EyeParameters {
            recommended_fov: fov,
            render_width: w,
            render_height: h,
        };
        let right = EyeParameters {
            recommended_fov: mirrored(&fov),
            ..left
        };
        Some(HeadsetInfo { left, right })
    }

    pub fn max_texture_size(&self) -> Result<u32> {
        anyhow::ensure!(self.max_texture_size > 0, "--max-texture-size must be positive");
        Ok(self.max_texture_size)
    }
}

fn mirrored(fov: &FieldOfView) -> FieldOfView {
    // Swapping edges of an already valid FOV cannot fail.
    FieldOfView::new(fov.up(), fov.down(), fov.right(), fov.left())
        .expect("mirrored field of view stays valid")
}

fn parse_fov(s: &str) -> Result<FieldOfView, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;

    let [up, down, left, right] = parts[..] else {
        return Err(format!("expected 4 comma-separated angles, got {}", parts.len()));
    };
    FieldOfView::new(up, down, left, right).map_err(|e| e.to_string())
}

fn parse_eye_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err("eye size must be non-zero".to_string());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("panoview").chain(args.iter().copied()))
    }

    // ── value parsers ─────────────────────────────────────────────────────

    #[test]
    fn fov_parses_four_angles() {
        let fov = parse_fov("45, 45, 50,40").unwrap();
        assert_eq!((fov.up(), fov.down(), fov.left(), fov.right()), (45.0, 45.0, 50.0, 40.0));
    }

    #[test]
    fn fov_rejects_wrong_count_and_bad_angles() {
        assert!(parse_fov("45,45,45").is_err());
        assert!(parse_fov("45,45,45,x").is_err());
        assert!(parse_fov("90,45,45,45").is_err());
    }

    #[test]
    fn eye_size_parses_wxh() {
        assert_eq!(parse_eye_size("1182x1464"), Ok((1182, 1464)));
        assert_eq!(parse_eye_size("640X480"), Ok((640, 480)));
        assert!(parse_eye_size("640").is_err());
        assert!(parse_eye_size("0x480").is_err());
    }

    // ── command line ──────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let args = parse(&["pano.jpg"]).unwrap();
        assert_eq!(args.images, vec![PathBuf::from("pano.jpg")]);
        assert_eq!(args.projection, ProjectionArg::Mono);
        assert!(args.headset().is_none());
        assert_eq!(args.max_texture_size().unwrap(), DEFAULT_MAX_TEXTURE_SIZE);
        assert!(!args.show_timing);
    }

    #[test]
    fn requires_an_image() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn headset_right_eye_is_mirrored() {
        let args = parse(&["--headset-fov", "45,45,50,40", "--headset-eye-size", "1000x1100", "a.png"]).unwrap();
        let info = args.headset().unwrap();
        assert_eq!(info.left.recommended_fov.left(), 50.0);
        assert_eq!(info.right.recommended_fov.left(), 40.0);
        assert_eq!(info.right.recommended_fov.right(), 50.0);
        assert_eq!(info.right.render_width, 1000);
        assert_eq!(info.left.render_height, 1100);
    }

    #[test]
    fn headset_size_defaults_and_requires_fov() {
        let args = parse(&["--headset-fov", "45,45,45,45", "a.png"]).unwrap();
        assert_eq!(args.headset().unwrap().left.render_width, DEFAULT_EYE_SIZE.0);

        assert!(parse(&["--headset-eye-size", "10x10", "a.png"]).is_err());
    }

    #[test]
    fn projection_and_pose_input() {
        let args = parse(&["--projection", "stereo", "--pose-input", "angles", "a.png"]).unwrap();
        assert_eq!(ProjectionMode::from(args.projection), ProjectionMode::Stereo);
        assert_eq!(args.pose_input, Some(PoseFormat::Angles));
    }

    #[test]
    fn zero_texture_size_is_rejected() {
        let args = parse(&["--max-texture-size", "0", "a.png"]).unwrap();
        assert!(args.max_texture_size().is_err());
    }
}
