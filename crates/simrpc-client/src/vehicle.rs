//! Typed wrapper over [`RpcSession`] for the host's vehicle API.
//!
//! Every method here is one remote call: marshal arguments into [`Value`]s,
//! invoke, unmarshal the result. No state beyond the session and the vehicle
//! name the host should address.

use std::io::{Read, Write};
use std::time::Duration;

use simrpc_transport::{Endpoint, TcpSession};
use simrpc_wire::Value;

use crate::connector::{self, SessionConfig};
use crate::error::{ClientError, Result};
use crate::session::RpcSession;
use crate::types::{CollisionInfo, Drivetrain, GeoPoint, Pose, YawMode};

/// Client handle for one vehicle on one simulation host.
///
/// The default vehicle name is the empty string, which the host resolves to
/// its single (or first) configured vehicle.
pub struct VehicleClient<S> {
    session: RpcSession<S>,
    vehicle_name: String,
}

impl VehicleClient<TcpSession> {
    /// Connect to a host with default configuration.
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self::from_session(connector::connect(endpoint)?))
    }

    /// Connect with explicit configuration.
    pub fn connect_with_config(endpoint: &Endpoint, config: &SessionConfig) -> Result<Self> {
        Ok(Self::from_session(connector::connect_with_config(
            endpoint, config,
        )?))
    }
}

impl<S: Read + Write> VehicleClient<S> {
    /// Wrap an existing session.
    pub fn from_session(session: RpcSession<S>) -> Self {
        Self {
            session,
            vehicle_name: String::new(),
        }
    }

    /// Address a named vehicle instead of the host's default.
    pub fn with_vehicle(mut self, vehicle_name: impl Into<String>) -> Self {
        self.vehicle_name = vehicle_name.into();
        self
    }

    /// The vehicle name sent with vehicle-scoped calls.
    pub fn vehicle_name(&self) -> &str {
        &self.vehicle_name
    }

    /// Borrow the underlying session, e.g. for generic `call` access.
    pub fn session_mut(&mut self) -> &mut RpcSession<S> {
        &mut self.session
    }

    /// Consume the wrapper and return the session.
    pub fn into_session(self) -> RpcSession<S> {
        self.session
    }

    fn vehicle_arg(&self) -> Value {
        Value::from(self.vehicle_name.as_str())
    }

    /// Liveness check; the host answers `true`.
    pub fn ping(&mut self) -> Result<bool> {
        let result = self.session.call("ping", vec![])?;
        expect_bool("ping", result)
    }

    /// API version of the connected host.
    pub fn server_version(&mut self) -> Result<i64> {
        let result = self.session.call("getServerVersion", vec![])?;
        expect_int("getServerVersion", result)
    }

    /// Minimum client API version the host will talk to.
    pub fn min_required_client_version(&mut self) -> Result<i64> {
        let result = self.session.call("getMinRequiredClientVersion", vec![])?;
        expect_int("getMinRequiredClientVersion", result)
    }

    /// Grant or revoke programmatic control of the vehicle.
    pub fn enable_api_control(&mut self, enabled: bool) -> Result<()> {
        let result = self.session.call(
            "enableApiControl",
            vec![Value::Bool(enabled), self.vehicle_arg()],
        )?;
        expect_void("enableApiControl", result)
    }

    pub fn is_api_control_enabled(&mut self) -> Result<bool> {
        let result = self
            .session
            .call("isApiControlEnabled", vec![self.vehicle_arg()])?;
        expect_bool("isApiControlEnabled", result)
    }

    /// Arm or disarm the vehicle. Returns whether the host accepted the
    /// transition.
    pub fn arm_disarm(&mut self, arm: bool) -> Result<bool> {
        let result = self
            .session
            .call("armDisarm", vec![Value::Bool(arm), self.vehicle_arg()])?;
        expect_bool("armDisarm", result)
    }

    /// Reset the whole simulation to its initial state. Affects every
    /// vehicle, not just this one.
    pub fn reset(&mut self) -> Result<()> {
        let result = self.session.call("reset", vec![])?;
        expect_void("reset", result)
    }

    /// Pause or resume simulation time.
    pub fn sim_pause(&mut self, pause: bool) -> Result<()> {
        let result = self.session.call("simPause", vec![Value::Bool(pause)])?;
        expect_void("simPause", result)
    }

    pub fn sim_is_paused(&mut self) -> Result<bool> {
        let result = self.session.call("simIsPause", vec![])?;
        expect_bool("simIsPause", result)
    }

    /// Ground-truth pose of the vehicle in world frame.
    pub fn sim_get_vehicle_pose(&mut self) -> Result<Pose> {
        let result = self
            .session
            .call("simGetVehiclePose", vec![self.vehicle_arg()])?;
        Pose::from_value(&result)
    }

    /// Teleport the vehicle. With `ignore_collision` the host places it even
    /// inside geometry.
    pub fn sim_set_vehicle_pose(&mut self, pose: &Pose, ignore_collision: bool) -> Result<()> {
        let result = self.session.call(
            "simSetVehiclePose",
            vec![
                pose.to_value(),
                Value::Bool(ignore_collision),
                self.vehicle_arg(),
            ],
        )?;
        expect_void("simSetVehiclePose", result)
    }

    pub fn sim_get_collision_info(&mut self) -> Result<CollisionInfo> {
        let result = self
            .session
            .call("simGetCollisionInfo", vec![self.vehicle_arg()])?;
        CollisionInfo::from_value(&result)
    }

    /// Geographic origin of the vehicle's local frame.
    pub fn home_geo_point(&mut self) -> Result<GeoPoint> {
        let result = self
            .session
            .call("getHomeGeoPoint", vec![self.vehicle_arg()])?;
        GeoPoint::from_value(&result)
    }

    /// Take off and climb to a safe hover altitude. Returns whether the
    /// maneuver completed within `timeout`.
    pub fn takeoff(&mut self, timeout: Duration) -> Result<bool> {
        let result = self.session.call(
            "takeoff",
            vec![Value::F32(timeout.as_secs_f32()), self.vehicle_arg()],
        )?;
        expect_bool("takeoff", result)
    }

    /// Descend and land. Returns whether the maneuver completed within
    /// `timeout`.
    pub fn land(&mut self, timeout: Duration) -> Result<bool> {
        let result = self.session.call(
            "land",
            vec![Value::F32(timeout.as_secs_f32()), self.vehicle_arg()],
        )?;
        expect_bool("land", result)
    }

    /// Hold the current position.
    pub fn hover(&mut self) -> Result<()> {
        let result = self.session.call("hover", vec![self.vehicle_arg()])?;
        expect_void("hover", result)
    }

    /// Fly at the given world-frame velocity (m/s, NED) for `duration`.
    pub fn move_by_velocity(
        &mut self,
        vx: f32,
        vy: f32,
        vz: f32,
        duration: Duration,
        drivetrain: Drivetrain,
        yaw_mode: YawMode,
    ) -> Result<bool> {
        let result = self.session.call(
            "moveByVelocity",
            vec![
                Value::F32(vx),
                Value::F32(vy),
                Value::F32(vz),
                Value::F32(duration.as_secs_f32()),
                drivetrain.to_value(),
                yaw_mode.to_value(),
                self.vehicle_arg(),
            ],
        )?;
        expect_bool("moveByVelocity", result)
    }
}

impl<S> std::fmt::Debug for VehicleClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleClient")
            .field("vehicle_name", &self.vehicle_name)
            .finish()
    }
}

fn expect_bool(method: &'static str, result: Value) -> Result<bool> {
    result.as_bool().ok_or_else(|| ClientError::UnexpectedPayload {
        what: method,
        detail: format!("expected bool, got {result}"),
    })
}

fn expect_int(method: &'static str, result: Value) -> Result<i64> {
    result.as_i64().ok_or_else(|| ClientError::UnexpectedPayload {
        what: method,
        detail: format!("expected integer, got {result}"),
    })
}

/// Void-returning host methods answer nil; anything else means the caller
/// and host disagree about the method.
fn expect_void(method: &'static str, result: Value) -> Result<()> {
    if result.is_nil() {
        Ok(())
    } else {
        Err(ClientError::UnexpectedPayload {
            what: method,
            detail: format!("expected nil, got {result}"),
        })
    }
}
