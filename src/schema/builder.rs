//! Interactive source / type / target pattern builder.
//!
//! Each selector accepts either an existing option or a freshly typed value.
//! Typed values are validated per field; a rejected value is reported next to
//! its field and never reaches the store.

use super::options::SelectOption;
use super::origin::Origin;
use super::store::{AddedPattern, PatternStore};
use super::triple::validate_field;
use crate::error::{Field, RegistryError, ValidationError, ValidationKind};

/// Current field errors of a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub source: Option<ValidationError>,
    pub rel_type: Option<ValidationError>,
    pub target: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.rel_type.is_none() && self.target.is_none()
    }

    fn slot(&mut self, field: Field) -> &mut Option<ValidationError> {
        match field {
            Field::Source => &mut self.source,
            Field::Type => &mut self.rel_type,
            Field::Target => &mut self.target,
        }
    }
}

/// Selection state of the pattern builder.
#[derive(Debug, Clone, Default)]
pub struct PatternBuilder {
    source: Option<SelectOption>,
    rel_type: Option<SelectOption>,
    target: Option<SelectOption>,
    errors: FieldErrors,
}

impl PatternBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn selection(&self, field: Field) -> Option<&SelectOption> {
        match field {
            Field::Source => self.source.as_ref(),
            Field::Type => self.rel_type.as_ref(),
            Field::Target => self.target.as_ref(),
        }
    }

    /// Select or type a value for `field`.
    ///
    /// Valid values become the field's selection and are offered as options
    /// from then on. Invalid ones clear the selection and set the field error.
    pub fn set(
        &mut self,
        store: &mut PatternStore,
        field: Field,
        raw: &str,
    ) -> Result<(), ValidationError> {
        match validate_field(field, raw) {
            Ok(value) => {
                let option = SelectOption::same(value);
                store.builder_options_mut().insert(field, option.clone());
                *self.selection_mut(field) = Some(option);
                *self.errors.slot(field) = None;
                Ok(())
            }
            Err(err) => {
                *self.selection_mut(field) = None;
                *self.errors.slot(field) = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Add the selected pattern to `origin`.
    ///
    /// The selection is reset on success and kept on failure so the user
    /// can adjust it.
    pub fn commit(
        &mut self,
        store: &mut PatternStore,
        origin: Origin,
    ) -> Result<AddedPattern, RegistryError> {
        let (Some(source), Some(rel_type), Some(target)) =
            (self.source.clone(), self.rel_type.clone(), self.target.clone())
        else {
            return Err(self.flag_missing().into());
        };

        let added = store.add_pattern(origin, &source, &rel_type, &target)?;
        self.source = None;
        self.rel_type = None;
        self.target = None;
        self.errors = FieldErrors::default();
        Ok(added)
    }

    /// Mark every unselected field and return the first field's error.
    fn flag_missing(&mut self) -> ValidationError {
        let mut first = None;
        for field in [Field::Source, Field::Type, Field::Target] {
            if self.selection(field).is_none() {
                let err = self
                    .errors
                    .slot(field)
                    .get_or_insert(ValidationError {
                        field,
                        kind: ValidationKind::Empty,
                    })
                    .clone();
                first.get_or_insert(err);
            }
        }
        first.unwrap_or(ValidationError {
            field: Field::Source,
            kind: ValidationKind::Empty,
        })
    }

    fn selection_mut(&mut self, field: Field) -> &mut Option<SelectOption> {
        match field {
            Field::Source => &mut self.source,
            Field::Type => &mut self.rel_type,
            Field::Target => &mut self.target,
        }
    }
}
