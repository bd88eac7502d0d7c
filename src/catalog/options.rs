use serde::Deserialize;
use serde_yaml::Value;

/// One recommended setup parameter, surfaced to the job as an environment variable
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SetupOption {
    pub name: String,

    #[serde(default)]
    pub value: Option<Value>,
}

impl SetupOption {
    /// Workflow environment key carrying this option, e.g. `go-version` -> `GO_VERSION`
    pub fn env_key(&self) -> String {
        env_key(&self.name)
    }
}

pub fn env_key(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

/// Whether a key names a version, the only kind strict mode enforces
pub fn is_version_key(key: &str) -> bool {
    key.to_uppercase().contains("VERSION")
}

/// Textual form of a scalar used when comparing recommended and existing values
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Parameter bundle loaded from one option catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionBundle {
    #[serde(default)]
    pub options: Vec<SetupOption>,
}

/// Service whose presence is detected from dependency manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Mongodb,
    Mysql,
    Redis,
    Elasticsearch,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Mongodb,
        Service::Mysql,
        Service::Redis,
        Service::Elasticsearch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Mongodb => "mongodb",
            Service::Mysql => "mysql",
            Service::Redis => "redis",
            Service::Elasticsearch => "elasticsearch",
        }
    }
}

/// Option bundles for the base system and each detectable service
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub apt: OptionBundle,
    pub mongodb: OptionBundle,
    pub mysql: OptionBundle,
    pub redis: OptionBundle,
    pub elasticsearch: OptionBundle,
}

impl ServiceOptions {
    pub fn for_service(&self, service: Service) -> &[SetupOption] {
        match service {
            Service::Mongodb => &self.mongodb.options,
            Service::Mysql => &self.mysql.options,
            Service::Redis => &self.redis.options,
            Service::Elasticsearch => &self.elasticsearch.options,
        }
    }

    /// Whether a setup parameter belongs to the base system or a service bundle
    pub fn is_service_parameter(key: &str) -> bool {
        key.contains("apt") || Service::ALL.iter().any(|s| key.contains(s.name()))
    }
}
