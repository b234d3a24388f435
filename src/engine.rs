//! The engine: one interner, one alias store, one set of options.
//!
//! Every query runs on a fresh [`TypeEvaluator`] borrowing the shared
//! interner and definitions, so an `Engine` can be shared across threads.
//! A query that records a rejection while evaluating returns it as `Err`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use tyrel_solver::{
    ConditionalType, DeepRule, DefId, DefinitionStore, Distribution, KeyRemap, PropertyInfo,
    Rejection, SolverOptions, TypeData, TypeEvaluator, TypeFormatter, TypeId,
    TypeInterner, TypeParamInfo, checked_record,
};

/// A rendered rejection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: u32,
    pub message_text: String,
}

pub struct Engine {
    interner: TypeInterner,
    definitions: DefinitionStore,
    options: SolverOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(SolverOptions::default())
    }

    pub fn with_options(options: SolverOptions) -> Self {
        Engine {
            interner: TypeInterner::new(),
            definitions: DefinitionStore::new(),
            options,
        }
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SolverOptions) {
        self.options = options;
    }

    fn evaluator(&self) -> TypeEvaluator<'_, DefinitionStore> {
        TypeEvaluator::with_resolver(&self.interner, &self.definitions)
            .with_options(self.options.clone())
    }

    /// Run a query and surface the first rejection it recorded.
    fn run<T>(
        &self,
        query: impl FnOnce(&mut TypeEvaluator<'_, DefinitionStore>) -> T,
    ) -> Result<T, Rejection> {
        let mut evaluator = self.evaluator();
        let result = query(&mut evaluator);
        match evaluator.take_rejections().into_iter().next() {
            Some(rejection) => {
                debug!(code = rejection.code(), "query rejected");
                Err(rejection)
            }
            None => Ok(result),
        }
    }

    fn try_run<T>(
        &self,
        query: impl FnOnce(&mut TypeEvaluator<'_, DefinitionStore>) -> Result<T, Rejection>,
    ) -> Result<T, Rejection> {
        self.run(query)?
    }

    // =========================================================================
    // Building types
    // =========================================================================

    pub fn attribute(&self, name: &str, type_id: TypeId) -> PropertyInfo {
        PropertyInfo::new(self.interner.intern_string(name), type_id)
    }

    /// Declare a record. Repeating an attribute name is a rejection.
    pub fn record(&self, attributes: Vec<PropertyInfo>) -> Result<TypeId, Rejection> {
        checked_record(&self.interner, attributes)
    }

    pub fn literal(&self, value: &str) -> TypeId {
        self.interner.literal_string(value)
    }

    /// Union of string literal keys; no names gives `never`.
    pub fn keys(&self, names: &[&str]) -> TypeId {
        self.interner
            .union(names.iter().map(|name| self.interner.literal_string(name)).collect())
    }

    pub fn param(&self, name: &str) -> TypeParamInfo {
        TypeParamInfo::new(self.interner.intern_string(name))
    }

    /// `check extends pattern ? then : otherwise`, distributive when the
    /// check type is a naked type parameter.
    pub fn conditional(
        &self,
        check_type: TypeId,
        extends_type: TypeId,
        true_type: TypeId,
        false_type: TypeId,
    ) -> TypeId {
        let is_distributive = matches!(
            self.interner.lookup(check_type),
            Some(TypeData::TypeParameter(_))
        );
        self.interner.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
            is_distributive,
        })
    }

    /// Register a generic alias in one step.
    pub fn define(&self, name: &str, params: Vec<TypeParamInfo>, body: TypeId) -> DefId {
        let def_id = self
            .definitions
            .register(self.interner.intern_string(name), params, body);
        trace!(def_id = def_id.0, name, "alias defined");
        def_id
    }

    /// Reserve an alias whose body refers to itself; see [`Engine::set_body`].
    pub fn declare(&self, name: &str, params: Vec<TypeParamInfo>) -> DefId {
        self.definitions
            .reserve(self.interner.intern_string(name), params)
    }

    pub fn set_body(&self, def_id: DefId, body: TypeId) -> bool {
        self.definitions.set_body(def_id, body)
    }

    /// Reference to an alias, unapplied.
    pub fn alias(&self, def_id: DefId) -> TypeId {
        self.interner.lazy(def_id)
    }

    pub fn apply(&self, def_id: DefId, args: Vec<TypeId>) -> TypeId {
        self.interner.application(self.interner.lazy(def_id), args)
    }

    // =========================================================================
    // Evaluation and the oracle
    // =========================================================================

    pub fn evaluate(&self, type_id: TypeId) -> Result<TypeId, Rejection> {
        self.run(|evaluator| evaluator.evaluate(type_id))
    }

    /// Evaluate, including meta-types nested inside records, tuples, arrays
    /// and signatures.
    pub fn evaluate_deep(&self, type_id: TypeId) -> Result<TypeId, Rejection> {
        self.run(|evaluator| evaluator.evaluate_deep(type_id))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(left = left.0, right = right.0))]
    pub fn equal(&self, left: TypeId, right: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.equal(left, right))
    }

    pub fn not_equal(&self, left: TypeId, right: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.not_equal(left, right))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(left = left.0, right = right.0))]
    pub fn alike(&self, left: TypeId, right: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.alike(left, right))
    }

    /// `Equal` as a boolean literal type.
    pub fn equal_type(&self, left: TypeId, right: TypeId) -> Result<TypeId, Rejection> {
        self.run(|evaluator| evaluator.equal_type(left, right))
    }

    pub fn alike_type(&self, left: TypeId, right: TypeId) -> Result<TypeId, Rejection> {
        self.run(|evaluator| evaluator.alike_type(left, right))
    }

    pub fn is_any(&self, type_id: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.is_any(type_id))
    }

    pub fn not_any(&self, type_id: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.not_any(type_id))
    }

    pub fn is_subtype(&self, source: TypeId, target: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.is_subtype(source, target))
    }

    /// Whether `value` matches `pattern`, binding any `infer` placeholders.
    pub fn conforms(&self, value: TypeId, pattern: TypeId) -> Result<bool, Rejection> {
        self.run(|evaluator| evaluator.conforms(value, pattern))
    }

    pub fn select(
        &self,
        subject: &TypeParamInfo,
        value: TypeId,
        pattern: TypeId,
        then_type: TypeId,
        else_type: TypeId,
        distribution: Distribution,
    ) -> Result<TypeId, Rejection> {
        self.run(|evaluator| {
            evaluator.select(subject, value, pattern, then_type, else_type, distribution)
        })
    }

    // =========================================================================
    // The gate
    // =========================================================================

    /// Accept exactly the literal `true` type.
    #[tracing::instrument(level = "debug", skip(self), fields(type_id = type_id.0))]
    pub fn expect(&self, type_id: TypeId) -> Result<(), Rejection> {
        self.try_run(|evaluator| evaluator.expect(type_id))
    }

    pub fn expect_false(&self, type_id: TypeId) -> Result<(), Rejection> {
        self.try_run(|evaluator| evaluator.expect_false(type_id))
    }

    /// `Expect<Equal<left, right>>`
    #[tracing::instrument(level = "debug", skip(self), fields(left = left.0, right = right.0))]
    pub fn expect_equal(&self, left: TypeId, right: TypeId) -> Result<(), Rejection> {
        self.try_run(|evaluator| evaluator.expect_equal(left, right))
    }

    pub fn is_true(&self, type_id: TypeId) -> Result<bool, Rejection> {
        let evaluated = self.evaluate(type_id)?;
        Ok(tyrel_solver::is_true(evaluated))
    }

    pub fn is_false(&self, type_id: TypeId) -> Result<bool, Rejection> {
        let evaluated = self.evaluate(type_id)?;
        Ok(tyrel_solver::is_false(evaluated))
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    pub fn pick(&self, source: TypeId, keys: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.pick(source, keys))
    }

    pub fn omit(&self, source: TypeId, keys: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.omit(source, keys))
    }

    pub fn exclude(&self, union: TypeId, excluded: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.exclude(union, excluded))
    }

    pub fn extract(&self, union: TypeId, extracted: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.extract(union, extracted))
    }

    pub fn readonly(&self, source: TypeId, on: bool) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.readonly(source, on))
    }

    pub fn optional(&self, source: TypeId, on: bool) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.optional(source, on))
    }

    pub fn readonly_keys(&self, source: TypeId, on: bool, keys: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.readonly_keys(source, on, keys))
    }

    pub fn optional_keys(&self, source: TypeId, on: bool, keys: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.optional_keys(source, on, keys))
    }

    #[tracing::instrument(level = "debug", skip(self, remap), fields(source = source.0))]
    pub fn rename_filter(&self, source: TypeId, remap: &KeyRemap) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.rename_filter(source, remap))
    }

    pub fn pick_by_value(&self, source: TypeId, pattern: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.pick_by_value(source, pattern))
    }

    pub fn omit_by_value(&self, source: TypeId, pattern: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.omit_by_value(source, pattern))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(source = source.0))]
    pub fn deep_transform(&self, source: TypeId, rule: DeepRule) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.deep_transform(source, rule))
    }

    pub fn merge(&self, base: TypeId, overlay: TypeId) -> Result<TypeId, Rejection> {
        self.try_run(|evaluator| evaluator.merge(base, overlay))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// The type as written, alias names included.
    pub fn display(&self, type_id: TypeId) -> String {
        TypeFormatter::new(&self.interner)
            .with_resolver(&self.definitions)
            .format(type_id)
    }

    /// The fully evaluated type. Falls back to the unevaluated form when
    /// evaluation is rejected.
    pub fn debug(&self, type_id: TypeId) -> String {
        let expanded = self.evaluate_deep(type_id).unwrap_or(type_id);
        self.display(expanded)
    }

    pub fn render(&self, rejection: &Rejection) -> Diagnostic {
        Diagnostic {
            code: rejection.code(),
            message_text: rejection.render(&self.interner),
        }
    }

    pub fn atom_text(&self, name: tyrel_solver::Atom) -> String {
        self.interner.resolve_atom(name)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
