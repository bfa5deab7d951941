//! Orbit camera and pointer rays

use glam::{Mat4, Vec2, Vec3, Vec4};
use tx_core::BoundingBox;

use crate::collision::Ray;
use crate::constants::camera::{
    DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR, FIT_DISTANCE_FACTOR,
};

/// World "up" convention of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorldUp {
    /// +Y is up
    Y,
    /// +Z is up
    #[default]
    Z,
}

impl WorldUp {
    /// Convention closest to an up vector
    pub fn from_up(up: Vec3) -> Self {
        if up.y.abs() >= up.z.abs() { Self::Y } else { Self::Z }
    }

    /// Unit up vector
    pub fn vector(&self) -> Vec3 {
        match self {
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Camera projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective with a vertical field of view in radians
    Perspective {
        /// Vertical field of view (radians)
        fov: f32,
    },
    /// Orthographic with a visible height in world units
    Orthographic {
        /// Visible height (world units)
        height: f32,
    },
}

/// Orbit camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Orbit center
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Projection model
    pub projection: Projection,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
    // Orbit state
    /// Orbit yaw (radians)
    pub yaw: f32,
    /// Orbit pitch (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
}

impl Camera {
    /// Create a perspective camera for a viewport, Z up
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_world_up(width, height, WorldUp::Z)
    }

    /// Create a perspective camera with the given up convention
    pub fn with_world_up(width: f32, height: f32, world_up: WorldUp) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: world_up.vector(),
            projection: Projection::Perspective {
                fov: DEFAULT_FOV_DEGREES.to_radians(),
            },
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            viewport: Vec2::new(width.max(1.0), height.max(1.0)),
            yaw: 45.0_f32.to_radians(),
            pitch: 30.0_f32.to_radians(),
            distance: 5.0,
        };
        camera.update_position_from_orbit();
        camera
    }

    /// Up convention derived from the up vector
    pub fn world_up(&self) -> WorldUp {
        WorldUp::from_up(self.up)
    }

    /// Viewport aspect ratio
    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// Unit vector from the eye towards the target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    fn update_position_from_orbit(&mut self) {
        let horizontal = self.distance * self.pitch.cos();
        let vertical = self.distance * self.pitch.sin();
        let offset = match self.world_up() {
            WorldUp::Z => Vec3::new(
                horizontal * self.yaw.cos(),
                horizontal * self.yaw.sin(),
                vertical,
            ),
            WorldUp::Y => Vec3::new(
                horizontal * self.yaw.sin(),
                vertical,
                horizontal * self.yaw.cos(),
            ),
        };
        self.position = self.target + offset;
    }

    /// Fit camera to show the given bounding sphere
    pub fn fit_all(&mut self, center: Vec3, radius: f32) {
        self.target = center;
        self.distance = (radius * FIT_DISTANCE_FACTOR).max(1.0);
        if let Projection::Orthographic { height } = &mut self.projection {
            *height = (radius * 2.0).max(1.0);
        }
        self.update_position_from_orbit();
    }

    /// Fit camera to a bounding box
    pub fn fit_bounds(&mut self, bounds: &BoundingBox) {
        if bounds.is_valid() {
            self.fit_all(bounds.center(), bounds.radius());
        }
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov } => {
                Mat4::perspective_rh(fov, self.aspect(), self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * self.aspect();
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    /// Convert screen coordinates (pixels, origin top-left) to a world ray
    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        let ndc_x = (2.0 * screen_x / self.viewport.x) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y / self.viewport.y);

        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).inverse();

        // glam's right-handed projections map depth to [0, 1]
        let near = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }

    /// Project a world point to screen coordinates.
    ///
    /// Returns `None` for points behind a perspective camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}
