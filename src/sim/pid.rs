//! Single-loop PID feedback controller.

/// Proportional, integral and derivative gains for one loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// A discrete PID controller tracking a fixed setpoint.
///
/// The integral accumulator has no windup guard: it grows for as long as
/// the error keeps its sign. Gains and setpoint are fixed at construction;
/// only the integral and the previous error change between updates.
///
/// # Examples
///
/// ```
/// use airseal_sim::sim::pid::PidController;
///
/// let mut pid = PidController::new(2.0, 0.5, 0.1, 22.0);
/// let output = pid.update(20.0, 1.0);
/// assert!((output - 5.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    previous_error: f64,
    integral: f64,
}

impl PidController {
    /// Creates a controller with zeroed integral and previous error.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `kd` - Derivative gain
    /// * `setpoint` - Target value for the measured variable
    pub fn new(kp: f64, ki: f64, kd: f64, setpoint: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint,
            previous_error: 0.0,
            integral: 0.0,
        }
    }

    /// Creates a controller from a gain triple.
    pub fn with_gains(gains: PidGains, setpoint: f64) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd, setpoint)
    }

    /// Computes the control output for one measurement.
    ///
    /// The derivative term is exactly zero when `dt <= 0`. Inputs are not
    /// validated; non-finite values propagate into the output.
    ///
    /// # Arguments
    ///
    /// * `measurement` - Current value of the controlled variable
    /// * `dt` - Time elapsed since the previous update
    ///
    /// # Returns
    ///
    /// `kp * error + ki * integral + kd * derivative`
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        let error = self.setpoint - measurement;

        self.integral += error * dt;

        let derivative = if dt > 0.0 {
            (error - self.previous_error) / dt
        } else {
            0.0
        };

        let output = self.kp * error + self.ki * self.integral + self.kd * derivative;

        self.previous_error = error;
        output
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    /// Error seen by the most recent [`update`](Self::update), or 0 before the first.
    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }

    /// Running sum of `error * dt` over the controller's lifetime.
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
