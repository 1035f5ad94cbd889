use super::{ValidationContext, ValidationResult};

type Rule<'a, T> = Box<dyn Fn(&T, &ValidationContext<'a>) -> ValidationResult + 'a>;

/// Accumulates rules for one entity and runs them all on [`execute`].
///
/// Rules never short-circuit; the result carries every violation in the
/// order the rules were added.
///
/// [`execute`]: ValidationBuilder::execute
pub struct ValidationBuilder<'a, T: ?Sized> {
    entity: &'a T,
    context: ValidationContext<'a>,
    rules: Vec<Rule<'a, T>>,
}

impl<'a, T: ?Sized> ValidationBuilder<'a, T> {
    pub fn new(entity: &'a T) -> Self {
        Self {
            entity,
            context: ValidationContext::default(),
            rules: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: ValidationContext<'a>) -> Self {
        self.context = context;
        self
    }

    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&T, &ValidationContext<'a>) -> ValidationResult + 'a,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds `rule` only when `condition` holds.
    pub fn rule_if<F>(self, condition: bool, rule: F) -> Self
    where
        F: Fn(&T, &ValidationContext<'a>) -> ValidationResult + 'a,
    {
        if condition {
            self.rule(rule)
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn execute(&self) -> ValidationResult {
        self.rules
            .iter()
            .map(|rule| rule(self.entity, &self.context))
            .collect()
    }
}
