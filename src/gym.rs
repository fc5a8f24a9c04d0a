//! Environment client for a gymnasium HTTP API server.
//!
//! Only environments whose observation and action spaces are both `Discrete`
//! can be trained with a table, anything else is refused on connect.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::env::{Environment, Step};
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct GymHttpEnv {
    client: Client,
    base_url: String,
    env_id: String,
    instance_id: String,
    n_states: usize,
    n_actions: usize,
    seed: Option<u64>,
}

impl GymHttpEnv {
    /// Create an instance of `env_id` on the server at `base_url`.
    pub fn connect(base_url: &str, env_id: &str) -> Result<GymHttpEnv> {
        let client = Client::builder().default_headers(common_headers()).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let created = post(&client, &format!("{base_url}/v1/envs/"), &json!({ "env_id": env_id }))?;
        let instance_id = created["instance_id"]
            .as_str()
            .ok_or_else(|| Error::environment("no instance_id returned"))?
            .to_string();

        let space_url = |space: &str| format!("{base_url}/v1/envs/{instance_id}/{space}/");
        let obs = get(&client, &space_url("observation_space"))?;
        let act = get(&client, &space_url("action_space"))?;
        let n_states = discrete_size(&obs["info"], env_id, "observation")?;
        let n_actions = discrete_size(&act["info"], env_id, "action")?;

        info!(env_id, %instance_id, n_states, n_actions, "Connected to gym environment.");
        Ok(GymHttpEnv {
            client,
            base_url,
            env_id: env_id.to_string(),
            instance_id,
            n_states,
            n_actions,
            seed: None,
        })
    }

    /// Seed passed to the next reset only, like gymnasium's `reset(seed=...)`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn env_id(&self) -> &str {
        &self.env_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Shut the instance down on the server.
    pub fn close(self) -> Result<()> {
        post(&self.client, &self.url("close"), &json!({}))?;
        debug!(instance_id = %self.instance_id, "Closed gym environment.");
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/v1/envs/{}/{}/", self.base_url, self.instance_id, endpoint)
    }
}

impl Environment for GymHttpEnv {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn reset(&mut self) -> Result<usize> {
        let body = match self.seed.take() {
            Some(seed) => json!({ "seed": seed }),
            None => json!({}),
        };
        let obj = post(&self.client, &self.url("reset"), &body)?;
        discrete_observation(&obj["observation"])
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if action >= self.n_actions {
            return Err(Error::InvalidAction { action, n_actions: self.n_actions });
        }
        let obj = post(&self.client, &self.url("step"), &json!({ "action": action }))?;
        parse_step(&obj)
    }
}

fn common_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn get(client: &Client, url: &str) -> Result<Value> {
    let res = client.get(url).send()?.error_for_status()?;
    Ok(res.json::<Value>()?)
}

fn post<T: Serialize + ?Sized>(client: &Client, url: &str, body: &T) -> Result<Value> {
    let res = client.post(url).json(body).send()?.error_for_status()?;
    Ok(res.json::<Value>()?)
}

/// Size of a `Discrete` space from a space `info` object.
fn discrete_size(info: &Value, env_id: &str, space: &str) -> Result<usize> {
    let info: &Map<String, Value> = info
        .as_object()
        .ok_or_else(|| Error::environment(format!("no {space} space info returned")))?;
    if info.get("name").and_then(Value::as_str) != Some("Discrete") {
        return Err(Error::UnsupportedSpace {
            env_id: env_id.to_string(),
            space: space.to_string(),
        });
    }
    info.get("n")
        .and_then(as_index)
        .ok_or_else(|| Error::environment(format!("{space} space has no size")))
}

/// Observations come back either bare or wrapped in a one-element list.
fn discrete_observation(value: &Value) -> Result<usize> {
    let value = match value.as_array() {
        Some(items) if items.len() == 1 => &items[0],
        Some(items) => {
            return Err(Error::environment(format!(
                "expected one discrete observation, got {}", items.len())))
        }
        None => value,
    };
    as_index(value).ok_or_else(|| Error::environment(format!("invalid observation: {value}")))
}

fn parse_step(obj: &Value) -> Result<Step> {
    let flag = |name: &str| {
        obj[name].as_bool().ok_or_else(|| Error::environment(format!("step has no '{name}' flag")))
    };
    Ok(Step {
        next_state: discrete_observation(&obj["observation"])?,
        reward: obj["reward"]
            .as_f64()
            .ok_or_else(|| Error::environment("step has no reward"))?,
        terminated: flag("terminated")?,
        truncated: flag("truncated")?,
    })
}

/// Non-negative integer given as a JSON number or a numeric string.
fn as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
