use super::ModuleCallInstance;
use std::fmt::{Display, Formatter};

/// Key selecting one instance of a repeated object
///
/// `count` produces integer keys, `for_each` produces string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstanceKey {
    Int(i64),
    String(String),
}

impl Display for InstanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceKey::Int(index) => write!(f, "[{index}]"),
            InstanceKey::String(key) => write!(f, "[{key:?}]"),
        }
    }
}

impl From<i64> for InstanceKey {
    fn from(value: i64) -> Self {
        InstanceKey::Int(value)
    }
}

impl From<&str> for InstanceKey {
    fn from(value: &str) -> Self {
        InstanceKey::String(value.to_string())
    }
}

/// Static module path, independent of instance keys
///
/// This is how configuration is looked up: every instance of a module call shares the same
/// configuration. The root module is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Module(Vec<String>);

impl Module {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut path = self.0.clone();
        path.push(name.into());
        Self(path)
    }

    pub fn call_names(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for Module {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, name) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "module.{name}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleInstanceStep {
    pub name: String,
    pub key: Option<InstanceKey>,
}

/// One concrete instantiation of a module in the configuration tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleInstance(Vec<ModuleInstanceStep>);

impl ModuleInstance {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[ModuleInstanceStep] {
        &self.0
    }

    pub fn child(&self, name: impl Into<String>, key: Option<InstanceKey>) -> Self {
        let mut steps = self.0.clone();
        steps.push(ModuleInstanceStep {
            name: name.into(),
            key,
        });
        Self(steps)
    }

    /// Splits off the last step
    ///
    /// Returns the calling module instance and the call (as seen from the caller) that created
    /// this instance. The root module has no caller.
    pub fn parent(&self) -> Option<(ModuleInstance, ModuleCallInstance)> {
        let (last, init) = self.0.split_last()?;
        let call = ModuleCallInstance::new(last.name.clone().into(), last.key.clone());
        Some((Self(init.to_vec()), call))
    }

    /// The static module this is an instance of
    pub fn module(&self) -> Module {
        self.0.iter().map(|step| step.name.clone()).collect()
    }
}

impl FromIterator<ModuleInstanceStep> for ModuleInstance {
    fn from_iter<T: IntoIterator<Item = ModuleInstanceStep>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for ModuleInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, step) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "module.{}", step.name)?;
            if let Some(key) = &step.key {
                write!(f, "{key}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        let instance = ModuleInstance::root()
            .child("network", Some("eu".into()))
            .child("subnet", Some(InstanceKey::Int(2)))
            .child("dns", None);

        assert_eq!(
            instance.to_string(),
            r#"module.network["eu"].module.subnet[2].module.dns"#
        );
        assert_eq!(
            instance.module().to_string(),
            "module.network.module.subnet.module.dns"
        );
        assert_eq!(ModuleInstance::root().to_string(), "");
    }

    #[test]
    fn parent() {
        let instance = ModuleInstance::root()
            .child("network", None)
            .child("subnet", Some(InstanceKey::Int(1)));

        let (caller, call) = instance.parent().expect("has a parent");
        assert_eq!(caller, ModuleInstance::root().child("network", None));
        assert_eq!(call.to_string(), "module.subnet[1]");

        assert!(ModuleInstance::root().parent().is_none());
    }
}
