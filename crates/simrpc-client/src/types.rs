//! Geometric and telemetry records exchanged with the simulation host.
//!
//! Field names here are the host's wire names (`x_val`, `w_val`, …) and must
//! not drift: records travel as msgpack maps keyed by these strings.

use simrpc_wire::Value;

use crate::error::{ClientError, Result};

/// 3D vector in the host's NED frame, metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("x_val"), Value::F32(self.x)),
            (Value::from("y_val"), Value::F32(self.y)),
            (Value::from("z_val"), Value::F32(self.z)),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            x: field_f32(value, "Vector3", "x_val")?,
            y: field_f32(value, "Vector3", "y_val")?,
            z: field_f32(value, "Vector3", "z_val")?,
        })
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Unit quaternion; identity by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("w_val"), Value::F32(self.w)),
            (Value::from("x_val"), Value::F32(self.x)),
            (Value::from("y_val"), Value::F32(self.y)),
            (Value::from("z_val"), Value::F32(self.z)),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            w: field_f32(value, "Quaternion", "w_val")?,
            x: field_f32(value, "Quaternion", "x_val")?,
            y: field_f32(value, "Quaternion", "y_val")?,
            z: field_f32(value, "Quaternion", "z_val")?,
        })
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position + orientation of a vehicle or scene object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl Pose {
    pub const fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("position"), self.position.to_value()),
            (Value::from("orientation"), self.orientation.to_value()),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            position: Vector3::from_value(field(value, "Pose", "position")?)?,
            orientation: Quaternion::from_value(field(value, "Pose", "orientation")?)?,
        })
    }
}

/// Geographic point (WGS84), altitude in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
}

impl GeoPoint {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            latitude: field_f64(value, "GeoPoint", "latitude")?,
            longitude: field_f64(value, "GeoPoint", "longitude")?,
            altitude: field_f32(value, "GeoPoint", "altitude")?,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("latitude"), Value::F64(self.latitude)),
            (Value::from("longitude"), Value::F64(self.longitude)),
            (Value::from("altitude"), Value::F32(self.altitude)),
        ])
    }
}

/// Yaw handling for velocity-based motion commands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YawMode {
    /// When true, `yaw_or_rate` is degrees/second; otherwise an absolute
    /// heading in degrees.
    pub is_rate: bool,
    pub yaw_or_rate: f32,
}

impl YawMode {
    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("is_rate"), Value::Bool(self.is_rate)),
            (Value::from("yaw_or_rate"), Value::F32(self.yaw_or_rate)),
        ])
    }
}

/// How the vehicle may use its degrees of freedom to satisfy a motion
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drivetrain {
    #[default]
    MaxDegreeOfFreedom,
    ForwardOnly,
}

impl Drivetrain {
    pub fn to_value(&self) -> Value {
        Value::Int(match self {
            Drivetrain::MaxDegreeOfFreedom => 0,
            Drivetrain::ForwardOnly => 1,
        })
    }
}

/// Most recent collision reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionInfo {
    pub has_collided: bool,
    pub normal: Vector3,
    pub impact_point: Vector3,
    pub position: Vector3,
    pub penetration_depth: f32,
    pub time_stamp: u64,
    pub object_name: String,
    pub object_id: i64,
}

impl CollisionInfo {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            has_collided: field(value, "CollisionInfo", "has_collided")?
                .as_bool()
                .ok_or_else(|| shape_err("CollisionInfo", "has_collided is not a bool"))?,
            normal: Vector3::from_value(field(value, "CollisionInfo", "normal")?)?,
            impact_point: Vector3::from_value(field(value, "CollisionInfo", "impact_point")?)?,
            position: Vector3::from_value(field(value, "CollisionInfo", "position")?)?,
            penetration_depth: field_f32(value, "CollisionInfo", "penetration_depth")?,
            time_stamp: field(value, "CollisionInfo", "time_stamp")?
                .as_u64()
                .ok_or_else(|| shape_err("CollisionInfo", "time_stamp is not an integer"))?,
            object_name: field(value, "CollisionInfo", "object_name")?
                .as_str()
                .ok_or_else(|| shape_err("CollisionInfo", "object_name is not a string"))?
                .to_string(),
            object_id: field(value, "CollisionInfo", "object_id")?
                .as_i64()
                .ok_or_else(|| shape_err("CollisionInfo", "object_id is not an integer"))?,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("has_collided"), Value::Bool(self.has_collided)),
            (Value::from("normal"), self.normal.to_value()),
            (Value::from("impact_point"), self.impact_point.to_value()),
            (Value::from("position"), self.position.to_value()),
            (
                Value::from("penetration_depth"),
                Value::F32(self.penetration_depth),
            ),
            (Value::from("time_stamp"), Value::from(self.time_stamp)),
            (
                Value::from("object_name"),
                Value::from(self.object_name.as_str()),
            ),
            (Value::from("object_id"), Value::Int(self.object_id)),
        ])
    }
}

fn field<'a>(value: &'a Value, ty: &'static str, key: &str) -> Result<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| shape_err(ty, &format!("missing field '{key}'")))
}

fn field_f32(value: &Value, ty: &'static str, key: &str) -> Result<f32> {
    field(value, ty, key)?
        .as_f32()
        .ok_or_else(|| shape_err(ty, &format!("field '{key}' is not numeric")))
}

fn field_f64(value: &Value, ty: &'static str, key: &str) -> Result<f64> {
    field(value, ty, key)?
        .as_f64()
        .ok_or_else(|| shape_err(ty, &format!("field '{key}' is not numeric")))
}

fn shape_err(what: &'static str, detail: &str) -> ClientError {
    ClientError::UnexpectedPayload {
        what,
        detail: detail.to_string(),
    }
}
