pub mod components;
pub mod config;
pub mod controller;
pub mod scene;
pub mod systems;

use anyhow::Context;
use components::{
    camera::CameraComponent,
    globe::{GlobeComponent, PinsComponent, SkyboxComponent},
};
use config::GlobeConfig;
use controller::{GlobeController, InputHandler};
use scene::Scene;
use systems::{
    assets::AssetSystem,
    camera::CameraSystem,
    globe::{GlobeSystem, PinsSystem, SkyboxSystem},
    material::MaterialSystem,
    overlay::Overlay,
    pipelines::DepthSystem,
};
use wgpu::Surface;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoopBuilder},
    window::{Window, WindowBuilder},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub trait Uniform {
    // only allow (multiples of?) 16 bytes of buffer
    // data to be compliant with WebGL2.
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer;

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup;
}

fn matrix4_to_array(mat: cgmath::Matrix4<f32>) -> [[f32; 4]; 4] {
    mat.into()
}

const GLOBE_FALLBACK_COLOR: [u8; 4] = [28, 68, 140, 255];
const PIN_FALLBACK_COLOR: [u8; 4] = [220, 60, 60, 255];

/// Events the browser sends into the winit loop.
#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    ViewportResized { width: f64, height: f64 },
}

struct State {
    // renderer
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    // scene
    scene: Scene,
    controller: GlobeController,
    camera_component: CameraComponent,
    globe: GlobeComponent,
    skybox: SkyboxComponent,
    pins: Option<PinsComponent>,

    cursor: (f32, f32),
}

impl State {
    async fn new(
        window: &Window,
        globe_config: &GlobeConfig,
        overlay: Box<dyn Overlay>,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // Backends::all => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = State::create_instance();

        // # Safety
        // The surface needs to live as long as the window that created it.
        // The window is moved into the event loop closure alongside State.
        let surface =
            unsafe { instance.create_surface(window) }.context("creating the render surface")?;
        let adapter = State::create_adapter(&instance, &surface).await?;
        let (device, queue) = State::create_device_and_queue(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders assume an sRGB surface texture, anything else comes out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface supports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = DepthSystem::create_depth_view(&device, config.width, config.height);

        tracing::info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "configured surface"
        );

        // textures, missing ones are swapped for generated stand-ins
        let textures = &globe_config.textures;
        let globe_image = AssetSystem::load_image_or(&textures.globe, || {
            MaterialSystem::solid_color(GLOBE_FALLBACK_COLOR)
        })
        .await;
        let skybox_image = AssetSystem::load_image_or(&textures.skybox, || {
            MaterialSystem::starfield(2048, 1024, 0.002, 3)
        })
        .await;
        let pin_image = AssetSystem::load_image_or(&textures.pin, || {
            MaterialSystem::solid_color(PIN_FALLBACK_COLOR)
        })
        .await;

        let mut scene = Scene::new(globe_config, config.width, config.height);
        let controller = GlobeController::new(
            config.width,
            config.height,
            window.scale_factor() as f32,
            overlay,
        );

        let camera_component = CameraSystem::create_camera_component(&device, &scene.camera);
        let skybox = SkyboxSystem::new(
            &device,
            &queue,
            config.format,
            &camera_component,
            globe_config,
            skybox_image,
        );
        let globe = GlobeSystem::new(
            &device,
            &queue,
            config.format,
            &camera_component,
            globe_config,
            globe_image,
        );
        let pins = PinsSystem::new(
            &device,
            &queue,
            config.format,
            &camera_component,
            &mut scene,
            pin_image,
        );

        Ok(Self {
            size,
            surface,
            device,
            queue,
            config,
            depth_view,
            scene,
            controller,
            camera_component,
            globe,
            skybox,
            pins,
            cursor: (0.0, 0.0),
        })
    }

    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
        })
    }

    pub async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &Surface,
    ) -> anyhow::Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this surface")
    }

    pub async fn create_device_and_queue(
        adapter: &wgpu::Adapter,
    ) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    // WebGL doesn't support all of wgpu's features, keep to
                    // its limits everywhere so both builds behave the same
                    limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    label: None,
                },
                None, // Trace path
            )
            .await
            .context("requesting a device")
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view =
                DepthSystem::create_depth_view(&self.device, new_size.width, new_size.height);
            self.controller
                .on_resize(&mut self.scene, new_size.width, new_size.height);
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                let (x, y) = self.cursor;
                self.controller.on_pointer_move(&mut self.scene, x, y);
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor;
                match state {
                    ElementState::Pressed => self.scene.controls.begin_rotate(x, y),
                    // a release ends a drag and is also a click, wherever it lands
                    ElementState::Released => {
                        self.scene.controls.end_rotate();
                        self.controller.on_click(&mut self.scene, x, y);
                    }
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.scene.controls.zoom(amount);
                true
            }
            _ => false,
        }
    }

    fn update(&mut self) {
        self.scene.update();
        CameraSystem::write_camera(&self.queue, &mut self.camera_component, &self.scene.camera);
        if let Some(pins) = &self.pins {
            PinsSystem::write_model_matrices(&self.queue, pins, &self.scene);
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // get the surface to provide a new SurfaceTexture that we will render to.
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // The encoder builds a command buffer that we can then send to the gpu.
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        render_pass.set_bind_group(0, &self.camera_component.camera_bind_group, &[]);

        // skybox
        let skybox = &self.skybox;
        render_pass.set_pipeline(&skybox.render_pipeline_component.render_pipeline);
        render_pass.set_bind_group(1, &skybox.material_component.bind_group, &[]);
        render_pass.set_bind_group(2, &skybox.mesh_component.model_matrix_bind_group, &[]);
        render_pass.set_vertex_buffer(0, skybox.mesh_component.vertex_buffer.slice(..));
        render_pass.set_index_buffer(
            skybox.mesh_component.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..skybox.mesh_component.num_indices, 0, 0..1);

        // globe
        let globe = &self.globe;
        render_pass.set_pipeline(&globe.render_pipeline_component.render_pipeline);
        render_pass.set_bind_group(1, &globe.material_component.bind_group, &[]);
        render_pass.set_bind_group(2, &globe.mesh_component.model_matrix_bind_group, &[]);
        render_pass.set_bind_group(3, &globe.lighting_bind_group, &[]);
        render_pass.set_vertex_buffer(0, globe.mesh_component.vertex_buffer.slice(..));
        render_pass.set_index_buffer(
            globe.mesh_component.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..globe.mesh_component.num_indices, 0, 0..1);

        // pins go last so they blend over the globe
        if let Some(pins) = &self.pins {
            render_pass.set_pipeline(&pins.render_pipeline_component.render_pipeline);
            render_pass.set_bind_group(1, &pins.material_component.bind_group, &[]);
            for (_, mesh) in &pins.meshes {
                render_pass.set_bind_group(2, &mesh.model_matrix_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
            }
        }

        drop(render_pass);

        // submit will accept anything that implements IntoIter
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub async fn run() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            tracing_wasm::set_as_global_default();
        } else {
            tracing_subscriber::fmt::init()
        }
    }

    if let Err(error) = start(GlobeConfig::default()).await {
        tracing::error!(error = %format!("{error:#}"), "globe failed to start");
    }
}

async fn start(globe_config: GlobeConfig) -> anyhow::Result<()> {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let window = WindowBuilder::new()
        .with_title("pinsphere")
        .build(&event_loop)
        .context("creating the window")?;

    #[cfg(target_arch = "wasm32")]
    let overlay: Box<dyn Overlay> = {
        use winit::platform::web::WindowExtWebSys;

        let browser = web_sys::window().context("no browser window")?;
        let document = browser.document().context("no document")?;

        // Winit prevents sizing with CSS, so we have to
        // set the size manually when on web.
        let viewport = |browser: &web_sys::Window| {
            (
                browser.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(1080.0),
                browser.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(1080.0),
            )
        };
        let (width, height) = viewport(&browser);
        window.set_inner_size(winit::dpi::LogicalSize::new(width, height));

        let canvas = web_sys::Element::from(window.canvas());
        let container: web_sys::Element = match document.get_element_by_id(&globe_config.container_id) {
            Some(container) => container,
            None => document.body().context("document has no body")?.into(),
        };
        container
            .append_child(&canvas)
            .map_err(|e| anyhow::anyhow!("appending canvas: {e:?}"))?;

        let proxy = event_loop.create_proxy();
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            if let Some(browser) = web_sys::window() {
                let (width, height) = viewport(&browser);
                let _ = proxy.send_event(UserEvent::ViewportResized { width, height });
            }
        });
        browser
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("listening for resize: {e:?}"))?;
        // lives as long as the page
        on_resize.forget();

        match systems::overlay::DomOverlay::new(canvas) {
            Ok(overlay) => Box::new(overlay),
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "popup overlay unavailable");
                Box::new(systems::overlay::LogOverlay::default())
            }
        }
    };
    #[cfg(not(target_arch = "wasm32"))]
    let overlay: Box<dyn Overlay> = Box::new(systems::overlay::LogOverlay::default());

    let mut state = State::new(&window, &globe_config, overlay).await?;

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == window.id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        scale_factor,
                        new_inner_size,
                    } => {
                        state.controller.set_scale_factor(*scale_factor as f32);
                        // new_inner_size is &&mut so we have to dereference it twice
                        state.resize(**new_inner_size);
                    }
                    _ => {}
                }
            }
        }
        Event::UserEvent(UserEvent::ViewportResized { width, height }) => {
            window.set_inner_size(winit::dpi::LogicalSize::new(width, height));
        }
        Event::RedrawRequested(window_id) if window_id == window.id() => {
            state.update();
            match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if lost
                Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                // The system is out of memory, we should probably quit
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory, exiting");
                    *control_flow = ControlFlow::Exit
                }
                // All other errors (Outdated, Timeout) should be resolved by the next frame
                Err(e) => tracing::warn!(error = ?e, "dropped frame"),
            }
        }
        Event::MainEventsCleared => {
            // RedrawRequested will only trigger once, unless we manually
            // request it.
            window.request_redraw();
        }

        _ => {}
    });
}
