//! Component registry en de componenten van de DLA-toolkit.

use std::collections::HashMap;
use std::fmt;

use crate::dla::{DlaError, Scheduler, Severity, ValidationError};
use crate::graph::node::MetaMap;
use crate::graph::value::Value;

pub mod coerce;
pub mod counter;
pub mod dla_crawl;
pub mod dla_visualizer;
pub mod simulation_param;

/// Output-map van een component: pinnickname → waarde.
pub type OutputMap = std::collections::BTreeMap<String, Value>;

/// Fouttype voor component-evaluaties. Beide varianten breken de evaluatie af;
/// ze verschillen alleen in het niveau waarmee de host ze toont.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Een fout met een bericht.
    Message(String),
    /// Een waarschuwing, bv. ontbrekende of ongeldige invoer.
    Warning(String),
}

impl ComponentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Message(s) | Self::Warning(s) => s,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Message(_) => Severity::Error,
            Self::Warning(_) => Severity::Warning,
        }
    }

    fn with_severity(severity: Severity, message: String) -> Self {
        match severity {
            Severity::Warning => Self::Warning(message),
            Severity::Error => Self::Message(message),
        }
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(s) => f.write_str(s),
            Self::Warning(s) => write!(f, "Warning: {s}"),
        }
    }
}

impl std::error::Error for ComponentError {}

impl From<ValidationError> for ComponentError {
    fn from(err: ValidationError) -> Self {
        Self::with_severity(err.severity(), err.to_string())
    }
}

impl From<DlaError> for ComponentError {
    fn from(err: DlaError) -> Self {
        Self::with_severity(err.severity(), err.to_string())
    }
}

/// Resultaat van een component-executie.
pub type ComponentResult = Result<OutputMap, ComponentError>;

/// Staatloze componenten: dezelfde invoer geeft altijd dezelfde uitvoer.
pub trait Component {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult;
}

/// Componenten met toestand die zichzelf via de host opnieuw laten oplossen.
///
/// De host roept `solve` aan; vraagt de component daarbij een nieuwe oplossing
/// aan via de `Scheduler`, dan roept de host na de vertraging eerst `tick` en
/// daarna opnieuw `solve` aan.
pub trait ScheduledComponent {
    fn solve(
        &mut self,
        inputs: &[Value],
        meta: &MetaMap,
        scheduler: &mut dyn Scheduler,
    ) -> ComponentResult;

    /// Het werk van de geplande callback.
    fn tick(&mut self) -> Result<(), ComponentError>;

    /// Statuslabel onder de component.
    fn message(&self) -> String;

    /// Niet-blokkerende waarschuwingen van de laatste `solve`.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Laat een staatloze component meedraaien in een geplande host-loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stateless<C>(pub C);

impl<C: Component> ScheduledComponent for Stateless<C> {
    fn solve(
        &mut self,
        inputs: &[Value],
        meta: &MetaMap,
        _scheduler: &mut dyn Scheduler,
    ) -> ComponentResult {
        self.0.evaluate(inputs, meta)
    }

    fn tick(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn message(&self) -> String {
        String::new()
    }
}

/// Registratie-informatie van een component.
pub struct Registration<T> {
    pub kind: T,
    /// GUIDs waarmee de component geïdentificeerd wordt.
    pub guids: &'static [&'static str],
    /// Namen en nicknames van de component.
    pub names: &'static [&'static str],
}

impl<T: Copy> Registration<T> {
    pub const fn new(
        kind: T,
        guids: &'static [&'static str],
        names: &'static [&'static str],
    ) -> Self {
        Self { kind, guids, names }
    }
}

/// Beschikbare componenttypen binnen de registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    SimulationParam,
    DlaVisualizer,
    DlaCrawl,
    Counter,
}

impl ComponentKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SimulationParam => "Simulation Attributes",
            Self::DlaVisualizer => "DLA Visualizer",
            Self::DlaCrawl => "DLA Crawl",
            Self::Counter => "MK_Counter",
        }
    }

    /// `true` voor componenten die toestand bewaren tussen oplossingen.
    #[must_use]
    pub fn is_stateful(self) -> bool {
        matches!(self, Self::DlaCrawl | Self::Counter)
    }

    /// Nieuwe instantie met verse toestand.
    #[must_use]
    pub fn instantiate(self) -> Box<dyn ScheduledComponent> {
        match self {
            Self::SimulationParam => Box::new(Stateless(simulation_param::ComponentImpl)),
            Self::DlaVisualizer => Box::new(Stateless(dla_visualizer::ComponentImpl)),
            Self::DlaCrawl => Box::new(dla_crawl::DlaCrawl::new()),
            Self::Counter => Box::new(counter::Counter::new()),
        }
    }
}

pub const REGISTRATIONS: &[Registration<ComponentKind>] = &[
    Registration::new(
        ComponentKind::SimulationParam,
        &["{6424e833-46ae-4a8f-90c9-c6af9e06ebc4}"],
        &["Simulation Attributes", "Attributes"],
    ),
    Registration::new(
        ComponentKind::DlaVisualizer,
        &["{27899113-cc84-425e-a89d-e74048f8ca3a}"],
        &["DLA Visualizer", "Visualizer", "dlavisualizer"],
    ),
    Registration::new(
        ComponentKind::DlaCrawl,
        &["{a541f904-ccbe-4087-9e4e-3256ca2369e1}"],
        &["DLA Crawl", "DLA", "dlacrawl"],
    ),
    Registration::new(
        ComponentKind::Counter,
        &["{285a1064-3416-43a2-a7fc-aed8732a1a1a}"],
        &["MK_Counter", "Counter"],
    ),
];

pub struct ComponentRegistry {
    by_guid: HashMap<String, ComponentKind>,
    by_name: HashMap<String, ComponentKind>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for registration in REGISTRATIONS {
            for guid in registration.guids {
                registry.register_guid(guid, registration.kind);
            }
            registry.register_names(registration.names, registration.kind);
        }
        registry
    }
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_guid: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register_guid(&mut self, guid: impl AsRef<str>, kind: ComponentKind) {
        let key = normalize_guid(guid.as_ref());
        self.by_guid.insert(key, kind);
    }

    pub fn register_names(&mut self, names: &[&str], kind: ComponentKind) {
        for name in names {
            let key = normalize_name(name);
            self.by_name.insert(key, kind);
        }
    }

    #[must_use]
    pub fn resolve(
        &self,
        guid: Option<&str>,
        name: Option<&str>,
        nickname: Option<&str>,
    ) -> Option<ComponentKind> {
        if let Some(component) = guid.and_then(|guid| self.by_guid.get(&normalize_guid(guid))) {
            return Some(*component);
        }

        [name, nickname]
            .into_iter()
            .flatten()
            .find_map(|name| self.by_name.get(&normalize_name(name)).copied())
    }
}

fn normalize_guid(guid: &str) -> String {
    guid.trim()
        .trim_matches(|c| c == '{' || c == '}')
        .to_lowercase()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{ComponentError, ComponentKind, ComponentRegistry};
    use crate::dla::{Severity, ValidationError};

    #[test]
    fn lookup_by_guid_and_name() {
        let registry = ComponentRegistry::default();

        let by_guid = registry
            .resolve(Some("A541F904-CCBE-4087-9E4E-3256CA2369E1"), None, None)
            .unwrap();
        assert_eq!(by_guid, ComponentKind::DlaCrawl);

        let by_name = registry.resolve(None, Some("Simulation Attributes"), None).unwrap();
        assert_eq!(by_name, ComponentKind::SimulationParam);

        let by_nickname = registry.resolve(None, None, Some("visualizer")).unwrap();
        assert_eq!(by_nickname, ComponentKind::DlaVisualizer);

        assert!(registry.resolve(Some("{00000000-0000-0000-0000-000000000000}"), None, None).is_none());
    }

    #[test]
    fn validation_errors_keep_their_level() {
        let warning = ComponentError::from(ValidationError::IntervalTooSmall { interval: 1 });
        assert_eq!(warning.severity(), Severity::Warning);
        assert!(warning.message().starts_with("Invalid interval. Must be greater than 1ms."));

        let error = ComponentError::from(ValidationError::ZeroScale);
        assert_eq!(error, ComponentError::new("Scale multiplier cannot be zero!"));
    }

    #[test]
    fn instances_start_fresh() {
        let counter = ComponentKind::Counter.instantiate();
        assert_eq!(counter.message(), "Stopped.");
        assert!(ComponentKind::Counter.is_stateful());
        assert!(!ComponentKind::DlaVisualizer.is_stateful());
    }
}
