//! Orbit camera and frame scheduling

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    /// Viewport size in pixels, for screen-space line extrusion
    pub viewport: [f32; 2],
    /// Half width of volumetric lines in pixels
    pub line_width: f32,
    pub _padding: f32,
}

/// Camera orbiting a target, with a uniform model scale on top.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub scale: f32,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub const MIN_DISTANCE: f32 = 1.0;
    pub const MAX_DISTANCE: f32 = 50000.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: 20.0,
            rotation: Quat::from_rotation_x(0.3),
            target: Vec3::ZERO,
            scale: 1.0,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 45.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = yaw_rotation * pitch_rotation * self.rotation;
        self.rotation = self.rotation.normalize();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Multiply the model scale; non-positive or non-finite factors are ignored.
    pub fn scale_by(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position());
        rotation_matrix * translation_matrix
    }

    pub fn model_view_matrix(&self) -> Mat4 {
        self.view_matrix() * Mat4::from_scale(Vec3::splat(self.scale))
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * self.model_view_matrix()
    }

    pub fn to_uniform(&self, viewport: Vec2, line_width: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            model_view: self.model_view_matrix().to_cols_array_2d(),
            viewport: viewport.to_array(),
            line_width,
            _padding: 0.0,
        }
    }
}

/// Input that moves the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    /// Drag, in radians
    Rotate { dx: f32, dy: f32 },
    Zoom(f32),
    Scale(f32),
    Resize { width: u32, height: u32 },
}

/// What the next frame has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// Events folded into this frame
    pub events: u32,
    /// Field lines must be retraced, not just redrawn
    pub retrace: bool,
}

/// Coalesces input between frames into at most one render per frame.
///
/// Events apply to the camera immediately; the scheduler only remembers that a
/// frame is owed. [`begin_frame`](Self::begin_frame) hands out that frame once.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending_events: u32,
    needs_render: bool,
    needs_retrace: bool,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, camera: &mut OrbitCamera, event: CameraEvent) {
        match event {
            CameraEvent::Rotate { dx, dy } => camera.rotate(dx, dy),
            CameraEvent::Zoom(delta) => camera.zoom(delta),
            CameraEvent::Scale(factor) => camera.scale_by(factor),
            CameraEvent::Resize { width, height } => camera.resize(width, height),
        }
        self.pending_events += 1;
        self.request_render();
    }

    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    /// The configuration changed; the next frame retraces.
    pub fn request_retrace(&mut self) {
        self.needs_retrace = true;
        self.needs_render = true;
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Take the owed frame, if any.
    pub fn begin_frame(&mut self) -> Option<FrameRequest> {
        if !self.needs_render {
            return None;
        }
        let request = FrameRequest {
            events: self.pending_events,
            retrace: self.needs_retrace,
        };
        self.pending_events = 0;
        self.needs_render = false;
        self.needs_retrace = false;
        self.frames += 1;
        Some(request)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
