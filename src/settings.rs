use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::RenderingMode;

/// Window, surface and camera configuration read from `settings.json`.
///
/// Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_title")]
    pub title: String,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default)]
    pub rendering_mode: RenderingMode,
    #[serde(default = "RenderSettings::default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default)]
    pub camera: CameraSettings,
    /// Asset manifest, relative to the working directory.
    #[serde(default = "RenderSettings::default_assets")]
    pub assets: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            rendering_mode: RenderingMode::default(),
            clear_color: Self::default_clear_color(),
            camera: CameraSettings::default(),
            assets: Self::default_assets(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if self.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            warn!("Clear colour components must lie in [0, 1]. Clamping.");
            for c in &mut self.clear_color {
                *c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
            }
        }

        let camera = &mut self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            warn!(
                "Camera field of view {} is outside (0, 180). Using default.",
                camera.fov_degrees
            );
            camera.fov_degrees = CameraSettings::default().fov_degrees;
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            warn!(
                "Camera clip planes near={} far={} are invalid. Using defaults.",
                camera.near, camera.far
            );
            let defaults = CameraSettings::default();
            camera.near = defaults.near;
            camera.far = defaults.far;
        }

        self
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    fn default_title() -> String {
        "wgpu instancing".to_owned()
    }

    const fn default_clear_color() -> [f32; 4] {
        [0.1, 0.1, 0.1, 1.0]
    }

    fn default_assets() -> PathBuf {
        PathBuf::from("assets/assets.json")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            clear_color: [2.0, -1.0, 0.5, f32::NAN],
            camera: CameraSettings {
                fov_degrees: 0.0,
                near: 10.0,
                far: 1.0,
            },
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();

        assert_eq!(validated.resolution, Resolution::default());
        assert_eq!(validated.clear_color, [1.0, 0.0, 0.5, 0.0]);
        assert_eq!(validated.camera, CameraSettings::default());
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            rendering_mode: RenderingMode::DebugLine,
            camera: CameraSettings {
                fov_degrees: 60.0,
                near: 0.5,
                far: 200.0,
            },
            ..RenderSettings::default()
        };

        assert_eq!(valid.clone().validate(), valid);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{"rendering_mode":"debug_line","camera":{"far":50.0}}"#)
                .unwrap();

        assert_eq!(settings.rendering_mode, RenderingMode::DebugLine);
        assert_eq!(settings.camera.far, 50.0);
        assert_eq!(settings.camera.near, CameraSettings::default().near);
        assert_eq!(settings.resolution, Resolution::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = RenderSettings::load_from_path("does/not/exist/settings.json");
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn present_mode_returns_desired_when_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo_then_first_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        assert_eq!(
            settings.present_mode(&[wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate]),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            settings.present_mode(&[wgpu::PresentMode::Immediate]),
            wgpu::PresentMode::Immediate
        );
    }
}
