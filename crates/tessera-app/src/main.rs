//! Headless terrain demo: builds the configured terrain, orbits a camera over
//! it while sculpting and painting, and optionally exports the result.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;
use tessera_app::{BrushInput, BrushSelection, TerrainDirector, TerrainError};
use tessera_brush::BrushKind;
use tessera_config::{CliArgs, Config};
use tessera_render::{Camera, DepthRange, HeadlessGpu, PatchDrawCall, TerrainGpuBuffers};
use tracing::{error, info, warn};

/// Frames between checks of `config.ron` for edits.
const CONFIG_POLL_FRAMES: u32 = 30;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);
    let file_config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Using default config: {e}");
            Config::default()
        }
    };
    let mut config = file_config.clone();
    config.apply_cli_overrides(&args);

    let log_dir = dirs::data_local_dir().map(|dir| dir.join("tessera").join("logs"));
    tessera_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    match run(&config, &args, &config_dir, file_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    config: &Config,
    args: &CliArgs,
    config_dir: &Path,
    mut file_config: Config,
) -> Result<(), TerrainError> {
    let mut director = TerrainDirector::from_config(config)?;
    let extent = director.terrain().world_extent();
    let center = Vec3::new(extent * 0.5, 0.0, extent * 0.5);
    let gpu = if args.gpu {
        start_gpu(&mut director)
    } else {
        None
    };

    let script = BrushScript::new(&args.strokes, center);
    let mut calls: Vec<PatchDrawCall> = Vec::new();
    let mut uploaded_vertices = 0;
    let mut uploaded_patches = 0;

    for frame in 0..args.frames {
        if frame > 0 && frame % CONFIG_POLL_FRAMES == 0 {
            poll_config(&mut director, &mut file_config, config_dir, args);
        }

        let angle = frame as f32 / args.frames.max(1) as f32 * std::f32::consts::TAU;
        let eye = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * extent * 0.75;
        let ground = director.terrain().height_interpolated(eye.x, eye.z);
        let camera = Camera {
            far: director.terrain().region_table().far_plane(),
            reverse_z: director.cull_settings().depth_range == DepthRange::Reversed,
            ..Camera::looking_at(eye.with_y(ground + extent * 0.25), center)
        };

        if let Some((kind, input)) = script.input_at(frame, director.brush().radius) {
            if director.brush().kind != kind {
                director.select_brush(BrushSelection {
                    kind,
                    ..*director.brush()
                });
            }
            director.handle_brush_input(input);
        }

        calls.clear();
        director.frame(&camera, &mut calls);

        let uploads = match &gpu {
            Some((gpu, buffers)) => {
                let uploads = director.upload(&gpu.queue, buffers);
                gpu.queue.submit([]);
                uploads
            }
            None => director.take_pending_uploads(),
        };
        uploaded_vertices += uploads.vertex_count();
        uploaded_patches += uploads.splat_patches.len();
    }

    info!(
        frames = director.frame_count(),
        uploaded_vertices, uploaded_patches, "demo finished"
    );

    if let Some(path) = &args.export {
        export(&director, path)?;
    }
    Ok(())
}

/// Headless device plus terrain buffers, or `None` when either is unavailable.
fn start_gpu(director: &mut TerrainDirector) -> Option<(HeadlessGpu, TerrainGpuBuffers)> {
    let gpu = match pollster::block_on(HeadlessGpu::new(false)) {
        Ok(gpu) => gpu,
        Err(e) => {
            warn!(error = %e, "GPU unavailable, edits stay on the CPU");
            return None;
        }
    };
    match director.create_gpu_buffers(&gpu.device) {
        Ok(buffers) => Some((gpu, buffers)),
        Err(e) => {
            warn!(error = %e, "terrain does not fit on this GPU, edits stay on the CPU");
            None
        }
    }
}

/// Apply edits to `config.ron` made while the demo runs. CLI overrides keep
/// precedence over the file.
fn poll_config(
    director: &mut TerrainDirector,
    file_config: &mut Config,
    config_dir: &Path,
    args: &CliArgs,
) {
    match file_config.reload(config_dir) {
        Ok(Some(reloaded)) => {
            let mut effective = reloaded.clone();
            effective.apply_cli_overrides(args);
            director.apply_config(&effective);
            *file_config = reloaded;
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "config not reloaded"),
    }
}

fn export(director: &TerrainDirector, path: &Path) -> Result<(), TerrainError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "could not create export directory");
    }
    director.terrain().save_heightmap(path)?;
    Ok(())
}

/// Scripted pointer input: one stroke per named brush, each dragged east
/// from the terrain center.
struct BrushScript {
    strokes: Vec<(u32, BrushKind)>,
    center: Vec3,
}

impl BrushScript {
    const FIRST_FRAME: u32 = 10;
    const SPACING: u32 = 30;
    const LENGTH: u32 = 20;

    fn new(names: &[String], center: Vec3) -> Self {
        let kinds = names.iter().filter_map(|name| {
            let kind = BrushKind::from_name(name);
            if kind.is_none() {
                warn!(brush = %name, "unknown brush, stroke skipped");
            }
            kind
        });
        let strokes = kinds
            .enumerate()
            .map(|(i, kind)| (Self::FIRST_FRAME + i as u32 * Self::SPACING, kind))
            .collect();
        Self { strokes, center }
    }

    fn input_at(&self, frame: u32, radius: f32) -> Option<(BrushKind, BrushInput)> {
        let (start, kind) = self
            .strokes
            .iter()
            .find(|(start, _)| (*start..=start + Self::LENGTH).contains(&frame))?;
        let step = frame - start;
        let x = self.center.x + step as f32 * radius * 0.25;
        let z = self.center.z;
        let input = match step {
            0 => BrushInput::Press { x, z },
            s if s == Self::LENGTH => BrushInput::Release,
            _ => BrushInput::Drag { x, z },
        };
        Some((*kind, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_skips_unknown_brushes() {
        let names = ["Smooth", "erode", "paint"].map(String::from);
        let script = BrushScript::new(&names, Vec3::new(64.0, 0.0, 64.0));
        assert_eq!(
            script.strokes,
            vec![(10, BrushKind::Smooth), (40, BrushKind::Paint)]
        );
    }

    #[test]
    fn test_script_press_drag_release() {
        let names = ["raise".to_string()];
        let script = BrushScript::new(&names, Vec3::new(64.0, 0.0, 64.0));
        assert_eq!(script.input_at(9, 8.0), None);
        assert_eq!(
            script.input_at(10, 8.0),
            Some((BrushKind::Raise, BrushInput::Press { x: 64.0, z: 64.0 }))
        );
        assert_eq!(
            script.input_at(12, 8.0),
            Some((BrushKind::Raise, BrushInput::Drag { x: 68.0, z: 64.0 }))
        );
        assert_eq!(
            script.input_at(30, 8.0),
            Some((BrushKind::Raise, BrushInput::Release))
        );
        assert_eq!(script.input_at(31, 8.0), None);
    }
}
