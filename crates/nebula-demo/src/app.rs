use anyhow::Result;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use nebula_engine::core::{App, AppControl, FrameCtx};
use nebula_engine::device::Gpu;
use nebula_engine::render::{MeshRenderer, ParticleRenderer};
use nebula_engine::shader::build_program;

use crate::config::DemoConfig;
use crate::state::DemoState;

struct Renderers {
    particles: ParticleRenderer,
    mesh: MeshRenderer,
}

/// The render loop: uploads once in `init`, then draws and animates.
pub struct DemoApp {
    state: DemoState,
    clear_color: wgpu::Color,
    renderers: Option<Renderers>,
}

impl DemoApp {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        Ok(Self {
            state: DemoState::load(config)?,
            clear_color: config.clear_color,
            renderers: None,
        })
    }
}

impl App for DemoApp {
    fn init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let device = gpu.device();
        let sink = gpu.diagnostics();
        let format = gpu.surface_format();

        let particle_program = build_program(
            device,
            sink,
            &ParticleRenderer::program_desc(format),
            &self.state.particle_sources.vertex,
            &self.state.particle_sources.fragment,
        )?;
        let mesh_program = build_program(
            device,
            sink,
            &MeshRenderer::program_desc(format, &self.state.mesh),
            &self.state.mesh_sources.vertex,
            &self.state.mesh_sources.fragment,
        )?;

        let particles = ParticleRenderer::new(device, particle_program, &self.state.particles);
        let mesh = MeshRenderer::new(
            device,
            mesh_program,
            &self.state.mesh,
            self.state.animation.uniform(),
        )?;

        self.renderers = Some(Renderers { particles, mesh });
        log::info!("render setup complete");
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderers) = self.renderers.as_ref() else {
            log::error!("frame requested before render setup");
            return AppControl::Exit;
        };

        let control = ctx.render(self.clear_color, |rctx, target| {
            renderers.particles.render(rctx, target);
            renderers.mesh.render(rctx, target);
        });
        if control == AppControl::Exit {
            return control;
        }

        self.state.advance();

        let queue = ctx.gpu.queue();
        renderers.particles.upload(queue, &self.state.particles);
        renderers.mesh.set_transform(queue, &self.state.animation.uniform());

        if ctx.frame_index % 600 == 0 {
            log::debug!(
                "frame {}: {} particles, mesh angle {:.0} deg, scale {:.4}",
                ctx.frame_index,
                renderers.particles.count(),
                self.state.animation.angle_degrees(),
                self.state.animation.scale()
            );
        }

        AppControl::Continue
    }
}
