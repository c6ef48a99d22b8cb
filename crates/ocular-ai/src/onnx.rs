//! ONNX Runtime backend for the fundus classifier.
//!
//! Expects a model exported with a single NHWC `float32[1,224,224,3]` input
//! and a softmax output of one probability per class.

use std::path::Path;
use std::sync::Mutex;

use ocular_core::NUM_CLASSES;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::adapter::ScoringModel;
use crate::normalize::NormalizedTensor;

/// Image classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so calls are serialized through a
/// mutex around the session. Decoding and resizing happen outside the lock.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    name: String,
}

impl OnnxClassifier {
    /// Load a classifier from an `.onnx` file.
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "model not found at {model_path:?}");

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| anyhow::anyhow!("model has no inputs"))?;

        // Refuse models whose declared output width is known and wrong.
        if let Some(classes) = session
            .outputs()
            .first()
            .and_then(|output| infer_classes(output.dtype()))
        {
            anyhow::ensure!(
                classes == NUM_CLASSES,
                "model outputs {classes} classes, expected {NUM_CLASSES}"
            );
        }

        let name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_path.display().to_string());

        info!(model = %model_path.display(), input = %input_name, "loaded fundus classifier");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            name,
        })
    }
}

impl ScoringModel for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: &NormalizedTensor) -> anyhow::Result<Vec<f32>> {
        let shape = NormalizedTensor::SHAPE.map(|d| d as i64);
        let tensor = Tensor::from_array((shape, input.as_slice().to_vec().into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier session lock poisoned"))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;

        // Softmax probabilities: [1, classes].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.first().is_none_or(|&batch| batch == 1),
            "unexpected output shape: {dims:?}, expected [1, {NUM_CLASSES}]"
        );

        Ok(output_data.to_vec())
    }
}

/// Try to read the class count from the model's output type.
fn infer_classes(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
