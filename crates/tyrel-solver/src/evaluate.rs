//! Type evaluation for meta-types (conditional, mapped, index access).
//!
//! Meta-types are "type-level functions" that compute output types from input types.
//! This module provides the evaluator driver; the rules for each meta-type
//! live in [`evaluate_rules`](crate::evaluate_rules):
//! - Conditional types: `T extends U ? X : Y`, with distribution and `infer`
//! - Mapped types: `{ [K in C as N]: T }`
//! - Index access, `keyof`, template literals and string intrinsics
//! - Alias application: `Name<Args>`
//!
//! Evaluation is shallow: record attributes, tuple elements and function
//! signatures are left as written until [`TypeEvaluator::evaluate_deep`]
//! walks into them.
//!
//! Failures are collected as pending [`Rejection`]s; the offending
//! sub-expression evaluates to `TypeId::ERROR`.

use crate::db::TypeDatabase;
use crate::def::{DefId, NoopResolver, TypeResolver};
use crate::diagnostics::Rejection;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::objects::ordered_properties;
use crate::options::SolverOptions;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::subtype::{Evaluate, SubtypeChecker};
use crate::type_queries::contains_type_parameters;
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Name prefix of the placeholders that stand for a re-entered alias in
/// folded deep evaluation.
const RECURSION_MARKER: &str = "^rec";

/// What `evaluate_deep` leaves behind when it re-enters an alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum DeepForm {
    /// The alias reference itself.
    Expanded,
    /// A placeholder naming how many expansions out the alias was entered.
    /// Structurally identical recursive aliases fold to the same id.
    Folded,
}

/// Type evaluator for meta-types.
///
/// Holds its own cache and recursion guard; one evaluator per thread.
pub struct TypeEvaluator<'a, R: TypeResolver = NoopResolver> {
    interner: &'a dyn TypeDatabase,
    resolver: &'a R,
    options: SolverOptions,
    cache: FxHashMap<TypeId, TypeId>,
    deep_cache: FxHashMap<(TypeId, DeepForm), TypeId>,
    /// Alias references whose bodies `evaluate_deep` is currently inside.
    expanding: Vec<TypeId>,
    guard: RecursionGuard<TypeId>,
    rejections: Vec<Rejection>,
}

impl<'a> TypeEvaluator<'a, NoopResolver> {
    /// Create a new evaluator without a resolver.
    pub fn new(interner: &'a dyn TypeDatabase) -> TypeEvaluator<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        TypeEvaluator::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        let options = SolverOptions::default();
        TypeEvaluator {
            interner,
            resolver,
            guard: RecursionGuard::with_profile(options.evaluation),
            options,
            cache: FxHashMap::default(),
            deep_cache: FxHashMap::default(),
            expanding: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.guard = RecursionGuard::with_profile(options.evaluation);
        self.options = options;
        self
    }

    // =========================================================================
    // Accessor methods for evaluate_rules modules
    // =========================================================================

    #[inline]
    pub fn interner(&self) -> &'a dyn TypeDatabase {
        self.interner
    }

    #[inline]
    pub fn resolver(&self) -> &'a R {
        self.resolver
    }

    #[inline]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    // =========================================================================
    // Pending rejections
    // =========================================================================

    pub(crate) fn reject(&mut self, rejection: Rejection) {
        debug!(code = rejection.code(), %rejection, "evaluation rejected");
        self.rejections.push(rejection);
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn first_rejection(&self) -> Option<&Rejection> {
        self.rejections.first()
    }

    pub fn take_rejections(&mut self) -> Vec<Rejection> {
        std::mem::take(&mut self.rejections)
    }

    /// Drop pending rejections and the exceeded flag, keeping the caches.
    pub fn clear_rejections(&mut self) {
        self.rejections.clear();
        self.guard.reset();
    }

    /// Number of pending rejections; used to detect failures of a sub-step.
    pub(crate) fn rejection_mark(&self) -> usize {
        self.rejections.len()
    }

    /// `Ok(result)` unless a rejection was recorded after `mark`.
    pub(crate) fn checked(&self, mark: usize, result: TypeId) -> Result<TypeId, Rejection> {
        match self.rejections.get(mark) {
            Some(rejection) => Err(rejection.clone()),
            None => Ok(result),
        }
    }

    // =========================================================================
    // Evaluation driver
    // =========================================================================

    /// Evaluate a type, resolving any meta-types if possible.
    /// Returns the evaluated type (may be the same if no evaluation needed).
    pub fn evaluate(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        let Some(key) = self.interner.lookup(type_id) else {
            return type_id;
        };

        match self.guard.enter(type_id) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(type_id = type_id.0, "evaluation cycle, returning unevaluated");
                return type_id;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                self.reject(Rejection::DepthExceeded { type_id });
                return TypeId::ERROR;
            }
        }

        let mark = self.rejection_mark();
        let result = self.visit_type_key(type_id, &key);
        self.guard.leave(type_id);

        // Failed sub-steps are re-evaluated so each query reports its rejection.
        if self.rejection_mark() == mark {
            self.cache.insert(type_id, result);
        }
        trace!(type_id = type_id.0, result = result.0, "evaluated");
        result
    }

    fn visit_type_key(&mut self, type_id: TypeId, key: &TypeData) -> TypeId {
        let interner = self.interner;
        match key {
            TypeData::Conditional(cond_id) => {
                let cond = interner.conditional_type(*cond_id);
                self.evaluate_conditional(type_id, &cond)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = interner.mapped_type(*mapped_id);
                self.evaluate_mapped(type_id, &mapped)
            }
            TypeData::KeyOf(operand) => self.evaluate_keyof(*operand),
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(*object, *index),
            TypeData::TemplateLiteral(list_id) => self.evaluate_template_literal(type_id, *list_id),
            TypeData::StringIntrinsic { kind, type_arg } => {
                self.evaluate_string_intrinsic(*kind, *type_arg)
            }
            TypeData::Lazy(def_id) => self.evaluate_lazy(type_id, *def_id),
            TypeData::Application(app_id) => self.evaluate_application(type_id, *app_id),
            TypeData::Union(list_id) => {
                let members: Vec<TypeId> = interner.type_list(*list_id).to_vec();
                let evaluated = members.into_iter().map(|m| self.evaluate(m)).collect();
                interner.union(evaluated)
            }
            TypeData::Intersection(list_id) => {
                let members: Vec<TypeId> = interner.type_list(*list_id).to_vec();
                let evaluated = members.into_iter().map(|m| self.evaluate(m)).collect();
                interner.intersection(evaluated)
            }
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Object(_)
            | TypeData::Tuple(_)
            | TypeData::Array(_)
            | TypeData::Function(_)
            | TypeData::TypeParameter(_)
            | TypeData::Infer(_) => type_id,
        }
    }

    /// Evaluate a reference to a non-generic alias.
    fn evaluate_lazy(&mut self, type_id: TypeId, def_id: DefId) -> TypeId {
        let Some(body) = self.resolver.resolve_lazy(def_id, self.interner) else {
            self.reject(Rejection::UnknownDefinition { def_id });
            return TypeId::ERROR;
        };
        let params = self.resolver.get_lazy_type_params(def_id).unwrap_or_default();
        if params.is_empty() {
            return self.evaluate(body);
        }
        // A bare reference to a generic alias applies it with its defaults.
        let application = self.interner.application(type_id, Vec::new());
        self.evaluate(application)
    }

    /// Evaluate a generic type application: Base<Args>
    ///
    /// Algorithm:
    /// 1. Resolve the `Lazy` base to the alias body and its type parameters
    /// 2. Check the argument count, filling trailing defaults
    /// 3. Check every argument against its parameter constraint
    /// 4. Instantiate the body and evaluate the result
    fn evaluate_application(&mut self, type_id: TypeId, app_id: TypeApplicationId) -> TypeId {
        let interner = self.interner;
        let app = interner.type_application(app_id);
        let Some(TypeData::Lazy(def_id)) = interner.lookup(app.base) else {
            return type_id;
        };
        let Some(body) = self.resolver.resolve_lazy(def_id, interner) else {
            self.reject(Rejection::UnknownDefinition { def_id });
            return TypeId::ERROR;
        };
        let params = self.resolver.get_lazy_type_params(def_id).unwrap_or_default();

        let min = params.iter().take_while(|p| p.default.is_none()).count();
        let max = params.len();
        if app.args.len() < min || app.args.len() > max {
            self.reject(Rejection::ArityMismatch {
                def_id,
                min,
                max,
                found: app.args.len(),
            });
            return TypeId::ERROR;
        }

        let substitution = TypeSubstitution::from_args(interner, &params, &app.args);
        for param in &params {
            let (Some(constraint), Some(argument)) = (param.constraint, substitution.get(param.name))
            else {
                continue;
            };
            let constraint = instantiate_type(interner, constraint, &substitution);
            if contains_type_parameters(interner, argument)
                || contains_type_parameters(interner, constraint)
            {
                continue;
            }
            let argument = self.evaluate(argument);
            let constraint = self.evaluate(constraint);
            if !self.is_subtype(argument, constraint) {
                self.reject(Rejection::ConstraintViolation {
                    argument,
                    constraint,
                });
                return TypeId::ERROR;
            }
        }

        trace!(def_id = def_id.0, args = app.args.len(), "instantiating alias");
        let instantiated = instantiate_type(interner, body, &substitution);
        self.evaluate(instantiated)
    }

    // =========================================================================
    // Deep evaluation
    // =========================================================================

    /// Evaluate a type and everything nested inside it.
    ///
    /// This is the "Debug" expansion: records come back with every attribute
    /// evaluated, so they print structurally and compare canonically.
    /// A reference to an alias that is already being expanded is kept as
    /// written, so `type List = { next: List }` expands one level.
    pub fn evaluate_deep(&mut self, type_id: TypeId) -> TypeId {
        self.evaluate_deep_inner(type_id, 0, DeepForm::Expanded)
    }

    /// Like [`evaluate_deep`](Self::evaluate_deep), but a re-entered alias
    /// becomes a positional placeholder instead of its reference.
    ///
    /// Two aliases with the same recursive structure fold to the same id.
    pub fn evaluate_deep_folded(&mut self, type_id: TypeId) -> TypeId {
        self.evaluate_deep_inner(type_id, 0, DeepForm::Folded)
    }

    fn evaluate_deep_inner(&mut self, type_id: TypeId, depth: u32, form: DeepForm) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        let interner = self.interner;
        let is_alias = matches!(
            interner.lookup(type_id),
            Some(TypeData::Lazy(_) | TypeData::Application(_))
        );
        if is_alias && let Some(position) = self.expanding.iter().rposition(|&id| id == type_id) {
            // Counted from the innermost expansion, so the placeholder does
            // not depend on what encloses the alias.
            let distance = self.expanding.len() - 1 - position;
            trace!(type_id = type_id.0, distance, "alias re-entered");
            return match form {
                DeepForm::Expanded => type_id,
                DeepForm::Folded => self.recursion_marker(distance),
            };
        }
        if let Some(&cached) = self.deep_cache.get(&(type_id, form)) {
            return cached;
        }
        if depth >= self.options.evaluation.max_depth() {
            self.reject(Rejection::DepthExceeded { type_id });
            return TypeId::ERROR;
        }

        if is_alias {
            self.expanding.push(type_id);
        }
        let mark = self.rejection_mark();
        // Members are evaluated one at a time below, keeping alias references visible.
        let evaluated = match interner.lookup(type_id) {
            Some(TypeData::Union(_) | TypeData::Intersection(_)) => type_id,
            _ => self.evaluate(type_id),
        };
        let depth = depth + 1;
        let result = match interner.lookup(evaluated) {
            Some(TypeData::Object(shape_id)) => {
                let properties = ordered_properties(interner, shape_id)
                    .into_iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.evaluate_deep_inner(prop.type_id, depth, form),
                        ..prop
                    })
                    .collect();
                interner.object(properties)
            }
            Some(TypeData::Union(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let members = members
                    .into_iter()
                    .map(|m| self.evaluate_deep_inner(m, depth, form))
                    .collect();
                interner.union(members)
            }
            Some(TypeData::Intersection(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let members = members
                    .into_iter()
                    .map(|m| self.evaluate_deep_inner(m, depth, form))
                    .collect();
                interner.intersection(members)
            }
            Some(TypeData::Tuple(list_id)) => {
                let elements: Vec<TupleElement> = interner.tuple_list(list_id).to_vec();
                let elements = elements
                    .into_iter()
                    .map(|element| TupleElement {
                        type_id: self.evaluate_deep_inner(element.type_id, depth, form),
                        ..element
                    })
                    .collect();
                interner.tuple(elements)
            }
            Some(TypeData::Array(element)) => {
                let element = self.evaluate_deep_inner(element, depth, form);
                interner.array(element)
            }
            Some(TypeData::Function(shape_id)) => {
                let shape = interner.function_shape(shape_id);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        type_id: self.evaluate_deep_inner(param.type_id, depth, form),
                        ..param.clone()
                    })
                    .collect();
                let return_type = self.evaluate_deep_inner(shape.return_type, depth, form);
                interner.function(FunctionShape {
                    type_params: shape.type_params.clone(),
                    params,
                    return_type,
                })
            }
            Some(TypeData::Conditional(cond_id)) => {
                // Deferred; normalise the parts so equal conditionals share an id.
                let cond = interner.conditional_type(cond_id);
                interner.conditional(ConditionalType {
                    check_type: self.evaluate_deep_inner(cond.check_type, depth, form),
                    extends_type: self.evaluate_deep_inner(cond.extends_type, depth, form),
                    true_type: self.evaluate_deep_inner(cond.true_type, depth, form),
                    false_type: self.evaluate_deep_inner(cond.false_type, depth, form),
                    is_distributive: cond.is_distributive,
                })
            }
            _ => evaluated,
        };
        if is_alias {
            self.expanding.pop();
        }

        // Inside an alias the result may mention the enclosing expansion.
        if self.expanding.is_empty() && self.rejection_mark() == mark {
            self.deep_cache.insert((type_id, form), result);
        }
        result
    }

    fn recursion_marker(&mut self, distance: usize) -> TypeId {
        let interner = self.interner;
        let name = interner.intern_string(&format!("{RECURSION_MARKER}{distance}"));
        interner.type_param(TypeParamInfo::new(name))
    }

    // =========================================================================
    // Relation hook
    // =========================================================================

    /// `source` is assignable to `target`.
    pub fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.interner;
        let profile = self.options.subtype;
        let mut checker = SubtypeChecker::new(interner, self).with_profile(profile);
        checker.is_subtype_of(source, target)
    }
}

impl<R: TypeResolver> Evaluate for TypeEvaluator<'_, R> {
    fn evaluate_type(&mut self, type_id: TypeId) -> TypeId {
        self.evaluate(type_id)
    }
}

/// Evaluate a type with no alias definitions available.
pub fn evaluate_type(interner: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
    let mut evaluator = TypeEvaluator::new(interner);
    evaluator.evaluate(type_id)
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
