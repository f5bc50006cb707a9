//! Remote execution backend
//!
//! Blocking client for a Qiskit-Runtime-style HTTP service. Circuits are
//! shipped as OpenQASM 3 with parameters bound, the cost layer expanded into
//! `rzz` gates. Expectation values go through the `estimator` program and
//! histograms through the `sampler` program. Every HTTP request is wrapped
//! in the configured [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use qcut_backend::remote::{RemoteBackend, RemoteConfig};
//! use qcut_backend::{Backend, SessionGuard};
//!
//! let config = RemoteConfig::new("your-api-token", "ibm_brisbane")
//!     .with_instance("crn:v1:...");
//! let backend = RemoteBackend::new(config)?;
//! let _session = SessionGuard::open(&backend)?;
//! // optimize / sample ...
//! # Ok::<(), qcut_backend::BackendError>(())
//! ```

use crate::{Backend, BackendError, BackendKind, Result, RetryPolicy};
use parking_lot::Mutex;
use qcut_core::{AnsatzCircuit, CancelToken, CostHamiltonian, Gate};
use qcut_state::SampleHistogram;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Remote service configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API base URL
    pub api_url: String,

    /// Bearer token
    pub api_token: String,

    /// Target device or cloud simulator
    pub backend_name: String,

    /// Service instance (CRN or hub/group/project)
    pub instance: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Limit on a single job from submission to result, in milliseconds
    pub job_timeout_ms: u64,

    /// Pause between status polls in milliseconds
    pub polling_interval_ms: u64,

    /// Largest register the device accepts
    pub max_qubits: usize,

    /// Retry policy for individual requests
    pub retry: RetryPolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.quantum.ibm.com".to_string(),
            api_token: String::new(),
            backend_name: String::new(),
            instance: None,
            request_timeout_ms: 30_000,
            job_timeout_ms: 600_000,
            polling_interval_ms: 2000,
            max_qubits: 127,
            retry: RetryPolicy::default(),
        }
    }
}

impl RemoteConfig {
    /// Configuration for `backend_name` authenticated with `api_token`
    pub fn new(api_token: impl Into<String>, backend_name: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            backend_name: backend_name.into(),
            ..Self::default()
        }
    }

    /// Set the service instance
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Set a custom API URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the polling interval
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the per-job timeout
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the device register limit
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("backend_name", &self.backend_name)
            .field("instance", &self.instance)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("job_timeout_ms", &self.job_timeout_ms)
            .field("polling_interval_ms", &self.polling_interval_ms)
            .field("max_qubits", &self.max_qubits)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Runtime program a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Estimator,
    Sampler,
}

impl Program {
    fn id(self) -> &'static str {
        match self {
            Program::Estimator => "estimator",
            Program::Sampler => "sampler",
        }
    }
}

/// Remote job status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Map a service status string; unknown strings count as failed
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "QUEUED" | "INITIALIZING" | "VALIDATING" => JobState::Queued,
            "RUNNING" => JobState::Running,
            "COMPLETED" | "DONE" => JobState::Completed,
            "CANCELLED" | "CANCELED" => JobState::Cancelled,
            _ => JobState::Failed,
        }
    }
}

/// Remote backend
pub struct RemoteBackend {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
    session: Mutex<Option<String>>,
    cancel: Mutex<CancelToken>,
}

/// Whether a request may be repeated after an ambiguous failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Reads, cancels and closes: any transient failure is retried
    Idempotent,
    /// Job and session creation: retried only when the service provably
    /// never accepted the request (connection refused, 429, 503)
    AtMostOnce,
}

impl RemoteBackend {
    /// Create a client; no request is made until the first job or session
    ///
    /// # Errors
    /// Returns error if the token or backend name is empty, a timeout is
    /// zero, or the HTTP client cannot be built
    pub fn new(config: RemoteConfig) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(BackendError::Authentication("API token is empty".to_string()));
        }
        if config.backend_name.trim().is_empty() {
            return Err(BackendError::InvalidParameters(
                "backend name is empty".to_string(),
            ));
        }
        if config.request_timeout_ms == 0 || config.job_timeout_ms == 0 {
            return Err(BackendError::InvalidParameters(format!(
                "timeouts must be positive (request {} ms, job {} ms)",
                config.request_timeout_ms, config.job_timeout_ms
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| BackendError::Network(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            config,
            client,
            session: Mutex::new(None),
            cancel: Mutex::new(CancelToken::new()),
        })
    }

    /// Share a cancellation token; polling stops and cancels the job when it fires
    pub fn with_cancel_token(self, cancel: CancelToken) -> Self {
        *self.cancel.lock() = cancel;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.lock().is_cancelled()
    }

    /// Configuration in use
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Current session ID, if a session is open
    pub fn session_id(&self) -> Option<String> {
        self.session.lock().clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Send a request built by `build`, retrying per `delivery`
    fn send<F>(&self, what: &str, delivery: Delivery, build: F) -> Result<reqwest::blocking::Response>
    where
        F: Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    {
        // Set by each attempt: true when the service cannot have acted on it
        let rejected = Cell::new(false);
        let retryable = |err: &BackendError| match delivery {
            Delivery::Idempotent => err.is_transient(),
            Delivery::AtMostOnce => rejected.get() && err.is_transient(),
        };

        self.config.retry.run_when(what, retryable, |attempt| {
            rejected.set(false);
            let mut request = build(&self.client).bearer_auth(&self.config.api_token);
            if let Some(ref instance) = self.config.instance {
                request = request.header("Service-CRN", instance);
            }
            debug!(request = what, attempt, "sending request");

            let response = request.send().map_err(|e| {
                rejected.set(e.is_connect());
                transport_error(e)
            })?;
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                rejected.set(matches!(status.as_u16(), 429 | 503));
                let body = response.text().unwrap_or_default();
                Err(status_error(status.as_u16(), &body))
            }
        })
    }

    fn submit(&self, program: Program, params: serde_json::Value) -> Result<String> {
        if self.is_cancelled() {
            return Err(BackendError::Cancelled);
        }

        let body = JobRequest {
            program_id: program.id(),
            backend: &self.config.backend_name,
            session_id: self.session_id(),
            params,
        };
        let response = self.send("submit job", Delivery::AtMostOnce, |c| c.post(self.url("jobs")).json(&body))?;
        let created: Created = response
            .json()
            .map_err(|e| BackendError::Serialization(format!("job response: {}", e)))?;

        info!(job_id = %created.id, program = program.id(), backend = %self.config.backend_name, "job submitted");
        Ok(created.id)
    }

    fn job_state(&self, job_id: &str) -> Result<(JobState, Option<String>)> {
        let response = self.send("job status", Delivery::Idempotent, |c| c.get(self.url(&format!("jobs/{}", job_id))))?;
        let info: JobInfo = response
            .json()
            .map_err(|e| BackendError::Serialization(format!("job status: {}", e)))?;
        let reason = info.state.and_then(|s| s.reason);
        Ok((JobState::parse(&info.status), reason))
    }

    /// Cancel a job
    pub fn cancel_job(&self, job_id: &str) -> Result<()> {
        self.send("cancel job", Delivery::Idempotent, |c| {
            c.post(self.url(&format!("jobs/{}/cancel", job_id)))
        })?;
        warn!(job_id, "job cancelled");
        Ok(())
    }

    /// Poll until the job completes, fails, times out or is cancelled
    fn wait(&self, job_id: &str) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(self.config.job_timeout_ms);
        let interval = Duration::from_millis(self.config.polling_interval_ms);

        loop {
            if self.is_cancelled() {
                if let Err(err) = self.cancel_job(job_id) {
                    warn!(job_id, error = %err, "failed to cancel job");
                }
                return Err(BackendError::Cancelled);
            }

            let (state, reason) = self.job_state(job_id)?;
            debug!(job_id, ?state, "job status");
            match state {
                JobState::Completed => return Ok(()),
                JobState::Failed => {
                    return Err(BackendError::JobFailed {
                        job_id: job_id.to_string(),
                        reason: reason.unwrap_or_else(|| "no reason given".to_string()),
                    })
                },
                JobState::Cancelled => return Err(BackendError::Cancelled),
                JobState::Queued | JobState::Running => {},
            }

            if Instant::now() >= deadline {
                if let Err(err) = self.cancel_job(job_id) {
                    warn!(job_id, error = %err, "failed to cancel timed-out job");
                }
                return Err(BackendError::Timeout(format!(
                    "job {} did not finish within {} ms",
                    job_id, self.config.job_timeout_ms
                )));
            }
            std::thread::sleep(interval);
        }
    }

    fn results<T: DeserializeOwned>(&self, job_id: &str) -> Result<T> {
        let response = self.send("job results", Delivery::Idempotent, |c| {
            c.get(self.url(&format!("jobs/{}/results", job_id)))
        })?;
        response
            .json()
            .map_err(|e| BackendError::Serialization(format!("job results: {}", e)))
    }
}

impl Backend for RemoteBackend {
    fn name(&self) -> &str {
        &self.config.backend_name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn max_qubits(&self) -> usize {
        self.config.max_qubits
    }

    fn expectation(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        _rng: &mut StdRng,
    ) -> Result<f64> {
        self.validate_request(circuit, cost, params)?;
        if cost.is_constant() {
            return Ok(0.0);
        }

        let qasm = to_qasm(circuit, cost, params, false);
        let observable: BTreeMap<String, f64> = cost_observable(cost).into_iter().collect();
        let job_id = self.submit(
            Program::Estimator,
            json!({ "pubs": [[qasm, observable]], "version": 2 }),
        )?;
        self.wait(&job_id)?;

        let results: PrimitiveResults<EstimatorData> = self.results(&job_id)?;
        results
            .results
            .first()
            .map(|r| r.data.evs)
            .ok_or_else(|| BackendError::Serialization("estimator returned no results".to_string()))
    }

    fn sample(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        shots: usize,
        _rng: &mut StdRng,
    ) -> Result<SampleHistogram> {
        self.validate_request(circuit, cost, params)?;
        if shots == 0 {
            return Err(BackendError::InvalidParameters(
                "shot count must be positive".to_string(),
            ));
        }

        let qasm = to_qasm(circuit, cost, params, true);
        let job_id = self.submit(
            Program::Sampler,
            json!({ "pubs": [[qasm, null, shots]], "version": 2 }),
        )?;
        self.wait(&job_id)?;

        let results: PrimitiveResults<SamplerData> = self.results(&job_id)?;
        let register = results
            .results
            .first()
            .map(|r| &r.data.c)
            .ok_or_else(|| BackendError::Serialization("sampler returned no results".to_string()))?;

        let counts = counts_from_samples(&register.samples, circuit.num_qubits())?;
        Ok(SampleHistogram::from_map(
            circuit.num_qubits(),
            Some(register.samples.len()),
            counts,
        )?)
    }

    fn open_session(&self) -> Result<()> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Ok(());
        }

        let body = json!({
            "backend": self.config.backend_name,
            "instance": self.config.instance,
            "mode": "dedicated",
        });
        let response = self.send("open session", Delivery::AtMostOnce, |c| c.post(self.url("sessions")).json(&body))?;
        let created: Created = response
            .json()
            .map_err(|e| BackendError::Serialization(format!("session response: {}", e)))?;

        info!(session_id = %created.id, backend = %self.config.backend_name, "remote session opened");
        *session = Some(created.id);
        Ok(())
    }

    fn bind_cancel_token(&self, token: &CancelToken) {
        *self.cancel.lock() = token.clone();
    }

    fn close_session(&self) -> Result<()> {
        let Some(id) = self.session.lock().take() else {
            return Ok(());
        };
        self.send("close session", Delivery::Idempotent, |c| {
            c.delete(self.url(&format!("sessions/{}/close", id)))
        })?;
        info!(session_id = %id, "remote session closed");
        Ok(())
    }
}

impl fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("config", &self.config)
            .field("session", &self.session_id())
            .finish()
    }
}

/// Serialize `circuit(params)` as OpenQASM 3
///
/// `CostPhase(θ)` becomes one `rzz(2·c·θ)` per term, since
/// `exp(−iθ c Z_iZ_j) = RZZ(2cθ)`. Measurements are emitted only when
/// `measure` is set; the estimator program takes unmeasured circuits.
pub fn to_qasm(
    circuit: &AnsatzCircuit,
    cost: &CostHamiltonian,
    params: &[f64],
    measure: bool,
) -> String {
    let n = circuit.num_qubits();
    let mut qasm = String::new();
    qasm.push_str("OPENQASM 3.0;\n");
    qasm.push_str("include \"stdgates.inc\";\n");
    let _ = writeln!(qasm, "qubit[{}] q;", n);
    if measure {
        let _ = writeln!(qasm, "bit[{}] c;", n);
    }

    for gate in circuit.gates() {
        match *gate {
            Gate::Superpose { qubit } => {
                let _ = writeln!(qasm, "h q[{}];", qubit);
            },
            Gate::Rotate { axis, qubit, param } => {
                let _ = writeln!(qasm, "r{}({}) q[{}];", axis, params[param], qubit);
            },
            Gate::CostPhase { param } => {
                for term in cost.terms() {
                    let angle = 2.0 * term.coefficient * params[param];
                    let _ = writeln!(qasm, "rzz({}) q[{}], q[{}];", angle, term.i, term.j);
                }
            },
            Gate::MeasureAll => {
                if measure {
                    qasm.push_str("c = measure q;\n");
                }
            },
        }
    }
    qasm
}

/// Cost interaction terms as Pauli strings (qubit 0 rightmost)
pub fn cost_observable(cost: &CostHamiltonian) -> Vec<(String, f64)> {
    let n = cost.num_qubits();
    cost.terms()
        .iter()
        .map(|term| {
            let pauli: String = (0..n)
                .rev()
                .map(|q| if q == term.i || q == term.j { 'Z' } else { 'I' })
                .collect();
            (pauli, term.coefficient)
        })
        .collect()
}

/// Tally hex-encoded shot outcomes into bitstring counts
///
/// Bit `q` of each integer is classical bit `c[q]`, measured from qubit `q`.
pub fn counts_from_samples(samples: &[String], num_bits: usize) -> Result<BTreeMap<String, f64>> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        let digits = sample
            .strip_prefix("0x")
            .or_else(|| sample.strip_prefix("0X"))
            .unwrap_or(sample);
        let value = u128::from_str_radix(digits, 16)
            .map_err(|_| BackendError::Serialization(format!("malformed sample {:?}", sample)))?;
        if num_bits < 128 && value >> num_bits != 0 {
            return Err(BackendError::Serialization(format!(
                "sample {} wider than {} bits",
                sample, num_bits
            )));
        }
        let bitstring: String = (0..num_bits)
            .map(|q| if value.checked_shr(q as u32).unwrap_or(0) & 1 == 1 { '1' } else { '0' })
            .collect();
        *counts.entry(bitstring).or_insert(0.0) += 1.0;
    }
    if counts.is_empty() {
        return Err(BackendError::Serialization("sampler returned no shots".to_string()));
    }
    Ok(counts)
}

/// Map a non-success HTTP status to an error
pub fn status_error(status: u16, body: &str) -> BackendError {
    let detail = format!("HTTP {}: {}", status, body);
    match status {
        401 | 403 => BackendError::Authentication(detail),
        408 | 504 => BackendError::Timeout(detail),
        429 => BackendError::RateLimited(detail),
        500..=599 => BackendError::Unavailable(detail),
        _ => BackendError::InvalidCircuit(detail),
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

// Wire formats

#[derive(Serialize)]
struct JobRequest<'a> {
    program_id: &'static str,
    backend: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
struct JobInfo {
    status: String,
    #[serde(default)]
    state: Option<JobStateInfo>,
}

#[derive(Deserialize)]
struct JobStateInfo {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct PrimitiveResults<T> {
    results: Vec<PubResult<T>>,
}

#[derive(Deserialize)]
struct PubResult<T> {
    data: T,
}

#[derive(Deserialize)]
struct EstimatorData {
    evs: f64,
}

#[derive(Deserialize)]
struct SamplerData {
    c: Register,
}

#[derive(Deserialize)]
struct Register {
    samples: Vec<String>,
}
