//! ONNX Runtime inference for the exported estimators. Input: [1, n] f32, output 0: predicted label.

use super::RawModel;
use crate::error::{AssessError, AssessResult};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxModel {
    /// Load model from path. A missing or unloadable artifact is a deployment problem,
    /// so it surfaces as a configuration error.
    pub fn load(path: &Path) -> AssessResult<Self> {
        if !path.exists() {
            return Err(AssessError::Configuration(format!(
                "model not found: {}",
                path.display()
            )));
        }
        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                AssessError::Configuration(format!("{} declares no outputs", path.display()))
            })?;

        tracing::info!(path = %path.display(), output = %output_name, "ONNX model loaded");
        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> AssessError {
    AssessError::Configuration(format!("loading {}: {}", path.display(), e))
}

/// Float-typed label outputs must hold an exact integer code.
fn float_label(v: f32) -> AssessResult<i64> {
    let v = f64::from(v);
    if !v.is_finite() || v.fract() != 0.0 || v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err(AssessError::ModelInference(format!(
            "label output {} is not an integer code",
            v
        )));
    }
    Ok(v as i64)
}

fn inference_err(e: impl std::fmt::Display) -> AssessError {
    AssessError::ModelInference(e.to_string())
}

impl RawModel for OnnxModel {
    fn predict(&self, input: &[f32]) -> AssessResult<i64> {
        let arr = Array2::from_shape_vec((1, input.len()), input.to_vec()).map_err(inference_err)?;
        let tensor = Value::from_array(arr).map_err(inference_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AssessError::ModelInference("session lock poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![tensor]).map_err(inference_err)?;
        let output = outputs.get(&self.output_name).ok_or_else(|| {
            AssessError::ModelInference(format!("missing output {}", self.output_name))
        })?;

        // Integer labels are the norm; some exporters emit float labels instead.
        let label = match output.try_extract_tensor::<i64>() {
            Ok((_, data)) => data.first().copied(),
            Err(_) => output
                .try_extract_tensor::<f32>()
                .map_err(inference_err)?
                .1
                .first()
                .copied()
                .map(float_label)
                .transpose()?,
        };
        label.ok_or_else(|| AssessError::ModelInference("empty prediction".to_string()))
    }
}
