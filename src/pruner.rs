//! Field pruning for serializers.
//!
//! A serializer hands over its ordered field descriptors and the context of
//! the object being written; it gets back the surviving fields, each paired
//! with the narrowed context its own output must be produced under.

use tracing::trace;

use crate::mask::includes_field;
use crate::types::MaskContext;

/// A named field in a serializer's field list.
pub trait FieldDescriptor {
    fn field_name(&self) -> &str;
}

impl<T: FieldDescriptor + ?Sized> FieldDescriptor for &T {
    fn field_name(&self) -> &str {
        (**self).field_name()
    }
}

/// A field that survived pruning, with the context for its nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedField<'a, F> {
    pub field: &'a F,
    pub context: MaskContext,
}

/// Filter `fields` by the mask in `ctx`, keeping their original order.
///
/// With no mask every field is returned with an unmasked context. Otherwise
/// each surviving field carries `ctx.narrow(name)`; a field wrapping a
/// nested object or a list of them should serialize that object under the
/// same context.
pub fn prune_fields<'a, F: FieldDescriptor>(
    fields: &'a [F],
    ctx: &MaskContext,
) -> Vec<PrunedField<'a, F>> {
    let Some((tree, is_negated)) = ctx.mask() else {
        return fields
            .iter()
            .map(|field| PrunedField {
                field,
                context: MaskContext::unmasked(),
            })
            .collect();
    };

    fields
        .iter()
        .filter(|field| {
            let keep = includes_field(field.field_name(), tree, is_negated);
            if !keep {
                trace!(field = field.field_name(), "pruned field");
            }
            keep
        })
        .map(|field| PrunedField {
            field,
            context: ctx.narrow(field.field_name()),
        })
        .collect()
}
