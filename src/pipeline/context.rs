//! The key/value context exchanged with the analysis engine.
//!
//! A context is created per image and passed by mutable reference through the
//! detection, fitting and quality stages. Stages add keys; nothing in the API
//! removes them, so later stages can always rely on what earlier ones wrote.

use crate::core::constants::{BAD_CONTEXT_CODE, IMAGE_KEY, OBJECTS_KEY};
use crate::core::errors::EngineError;
use crate::utils::tensor::TensorDescriptor;
use serde_json::{Map, Value};

/// Hierarchical context holding the input image and stage outputs.
///
/// Scalars, nested contexts and sequences of contexts are stored as JSON
/// values. The pixel buffer itself lives in a typed slot so it can borrow the
/// decoder's memory; its shape and element type are mirrored under `image`.
#[derive(Debug, Default)]
pub struct PipelineContext<'a> {
    image: Option<TensorDescriptor<'a>>,
    values: Map<String, Value>,
}

impl<'a> PipelineContext<'a> {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context holding `image` under the `image` key.
    pub fn with_image(image: TensorDescriptor<'a>) -> Self {
        let mut values = Map::new();
        values.insert(IMAGE_KEY.to_string(), image.metadata());
        Self {
            image: Some(image),
            values,
        }
    }

    /// The input image, if one was attached.
    pub fn image(&self) -> Option<&TensorDescriptor<'a>> {
        self.image.as_ref()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Looks up a nested value with a JSON pointer such as `/objects/0/quality`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let value = self.values.get(head)?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }

    /// Returns true when `key` has been written.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Writes `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Appends `value` to the sequence stored under `key`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Fails when `key` already holds something other than a sequence.
    pub fn push(&mut self, key: &str, value: impl Into<Value>) -> Result<(), EngineError> {
        self.sequence_mut(key)?.push(value.into());
        Ok(())
    }

    /// Returns the sequence stored under `key`, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Fails when `key` already holds something other than a sequence.
    pub fn sequence_mut(&mut self, key: &str) -> Result<&mut Vec<Value>, EngineError> {
        self.values
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| EngineError::new(BAD_CONTEXT_CODE, format!("'{key}' is not a sequence")))
    }

    /// The detected objects, empty when detection found nothing or has not run.
    pub fn objects(&self) -> &[Value] {
        self.values
            .get(OBJECTS_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of detected objects.
    pub fn object_count(&self) -> usize {
        self.objects().len()
    }
}
