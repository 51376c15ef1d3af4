//! # Expression Synthesis
//!
//! Turns each [`ColumnSpec`], in resolved order, into the expression that
//! produces its values. References are bound to the slots of columns that
//! were already synthesized, so a column always reads another column's
//! produced value and never re-derives it. Declarations with
//! `num_columns > 1` are expanded here, either into independently seeded
//! sibling columns or into one array column.

pub mod expr;
pub mod shape;

use std::collections::HashMap;

use tracing::debug;

use self::expr::{Binding, ColumnExpr, OrdinalSource, ValueExpr, ValueSource};
use crate::distribution::seed::SeedKey;
use crate::distribution::NullInjection;
use crate::error::{PlanError, Result};
use crate::spec::options::ComputeMethod;
use crate::spec::ColumnSpec;

/// A column's finished expression and the output names it produces.
#[derive(Debug, Clone)]
pub struct SynthesizedColumn {
    pub expr: ColumnExpr,
    pub outputs: Vec<String>,
}

/// Binds and expands columns one at a time, in evaluation order.
pub struct Synthesizer<'a> {
    plan_seed: u64,
    seed_column: &'a str,
    slots: HashMap<String, usize>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(plan_seed: u64, seed_column: &'a str) -> Self {
        Self {
            plan_seed,
            seed_column,
            slots: HashMap::new(),
        }
    }

    /// Synthesize the next column. Every column it reads must already have
    /// been synthesized.
    pub fn synthesize(&mut self, spec: &ColumnSpec) -> Result<SynthesizedColumn> {
        let name = spec.name();
        let options = spec.options();
        let key = SeedKey::for_column(
            self.plan_seed,
            name,
            options.random_seed_method.unwrap_or_default(),
            options.random_seed,
        );
        let replicas = spec.replicas();

        let mut elements = (0..replicas)
            .map(|i| {
                let seed = if replicas > 1 { key.sibling(i) } else { key };
                self.element(spec, seed, i)
            })
            .collect::<Result<Vec<_>>>()?;

        let (expr, outputs) = if spec.is_array() {
            (ColumnExpr::Array(elements), vec![name.to_string()])
        } else if replicas == 1 {
            let Some(only) = elements.pop() else {
                return Err(PlanError::invalid(name, "column produced no expression"));
            };
            (ColumnExpr::Scalar(only), vec![name.to_string()])
        } else {
            let outputs = (0..replicas).map(|i| format!("{}_{}", name, i)).collect();
            (ColumnExpr::Siblings(elements), outputs)
        };

        debug!(
            column = name,
            kind = %spec.kind(),
            outputs = outputs.len(),
            seed = %key,
            "synthesized column"
        );

        let slot = self.slots.len();
        self.slots.insert(name.to_string(), slot);

        Ok(SynthesizedColumn { expr, outputs })
    }

    fn element(&self, spec: &ColumnSpec, seed: SeedKey, index: usize) -> Result<ValueExpr> {
        let name = spec.name();
        let p = spec.null_probability();
        let nulls = (p > 0.0).then_some(NullInjection {
            probability: p,
            seed,
        });

        let source = match spec.template() {
            Some(template) => ValueSource::Template {
                template: template.clone(),
                bindings: template
                    .placeholders()
                    .iter()
                    .map(|reference| self.bind(name, reference))
                    .collect::<Result<_>>()?,
            },
            None => {
                let distribution = spec
                    .distribution()
                    .cloned()
                    .ok_or_else(|| PlanError::invalid(name, "column has no distribution"))?;
                let random = distribution.is_random();
                let ordinal = if random {
                    OrdinalSource::Value(self.row_id())
                } else {
                    self.ordinal_source(spec)?
                };
                ValueSource::Sample {
                    distribution,
                    seed,
                    ordinal,
                    offset: if random { 0 } else { index as i64 },
                    shape: spec.random_distribution(),
                }
            }
        };

        Ok(ValueExpr {
            source,
            data_type: spec.data_type(),
            shaping: spec.shaping().cloned(),
            nulls,
        })
    }

    fn ordinal_source(&self, spec: &ColumnSpec) -> Result<OrdinalSource> {
        let bases = spec.base_columns();
        if bases.is_empty() {
            return Ok(OrdinalSource::Value(self.row_id()));
        }
        match spec.compute_method() {
            ComputeMethod::Hash => Ok(OrdinalSource::Hash(
                bases
                    .iter()
                    .map(|b| self.bind(spec.name(), b))
                    .collect::<Result<_>>()?,
            )),
            _ => Ok(OrdinalSource::Value(self.bind(spec.name(), &bases[0])?)),
        }
    }

    fn row_id(&self) -> Binding {
        Binding::RowId {
            name: self.seed_column.to_string(),
        }
    }

    fn bind(&self, column: &str, reference: &str) -> Result<Binding> {
        if reference == self.seed_column {
            return Ok(self.row_id());
        }
        match self.slots.get(reference) {
            Some(&slot) => Ok(Binding::Column {
                name: reference.to_string(),
                slot,
            }),
            None => Err(PlanError::UnknownReference {
                column: column.to_string(),
                reference: reference.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::options::ColumnOptions;
    use crate::spec::types::DataType;

    fn spec(name: &str, dt: DataType, opts: ColumnOptions) -> ColumnSpec {
        ColumnSpec::new(name, dt, opts).unwrap()
    }

    #[test]
    fn test_binds_to_earlier_slots() {
        let mut synth = Synthesizer::new(42, "id");
        synth
            .synthesize(&spec("a", DataType::Int, ColumnOptions::new().range(1, 9, 1)))
            .unwrap();
        let b = synth
            .synthesize(&spec("b", DataType::Int, ColumnOptions::new().base_column("a").min(10)))
            .unwrap();
        match &b.expr {
            ColumnExpr::Scalar(ValueExpr {
                source: ValueSource::Sample { ordinal, .. },
                ..
            }) => assert_eq!(
                ordinal,
                &OrdinalSource::Value(Binding::Column {
                    name: "a".into(),
                    slot: 0
                })
            ),
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn test_unsynthesized_reference_fails() {
        let mut synth = Synthesizer::new(42, "id");
        let err = synth
            .synthesize(&spec("b", DataType::Int, ColumnOptions::new().base_column("a")))
            .unwrap_err();
        assert!(matches!(err, PlanError::UnknownReference { .. }));
    }

    #[test]
    fn test_expansion_names_siblings() {
        let mut synth = Synthesizer::new(42, "id");
        let r = synth
            .synthesize(&spec(
                "r",
                DataType::Double,
                ColumnOptions::new().range(0.0, 1.0, 0.01).random(true).num_columns(3),
            ))
            .unwrap();
        assert_eq!(r.outputs, vec!["r_0", "r_1", "r_2"]);
        let seeds: Vec<SeedKey> = r
            .expr
            .elements()
            .iter()
            .filter_map(|e| match &e.source {
                ValueSource::Sample { seed, .. } => Some(*seed),
                ValueSource::Template { .. } => None,
            })
            .collect();
        assert_eq!(seeds.len(), 3);
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
    }

    #[test]
    fn test_array_expansion_is_one_output() {
        let mut synth = Synthesizer::new(42, "id");
        let f = synth
            .synthesize(&spec(
                "features",
                DataType::Double,
                ColumnOptions::new().range(0.0, 1.0, 0.1).random(true).array(4),
            ))
            .unwrap();
        assert_eq!(f.outputs, vec!["features"]);
        assert!(matches!(f.expr, ColumnExpr::Array(ref e) if e.len() == 4));
    }

    #[test]
    fn test_template_binds_row_id() {
        let mut synth = Synthesizer::new(1, "row_num");
        let t = synth
            .synthesize(&spec("t", DataType::String, ColumnOptions::new().expr("${row_num} % 7")))
            .unwrap();
        match &t.expr {
            ColumnExpr::Scalar(ValueExpr {
                source: ValueSource::Template { bindings, .. },
                ..
            }) => assert_eq!(
                bindings,
                &vec![Binding::RowId {
                    name: "row_num".into()
                }]
            ),
            other => panic!("unexpected expression {:?}", other),
        }
    }
}
