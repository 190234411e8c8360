//! Burnモデルによる `Classifier` 実装

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use burn::{
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::{backend::Backend, Tensor},
};

use crate::crop::CropType;
use crate::error::{PredictError, Result};
use crate::ml::classifier::Classifier;
use crate::ml::leaf_model::{LeafClassifier, LeafClassifierRecord, LeafModelConfig};
use crate::ml::preprocess::ImageTensor;

/// 読み込み済みの葉画像分類器
pub struct BurnClassifier<B: Backend> {
    crop: CropType,
    input_shape: [usize; 4],
    num_classes: usize,
    // 順伝播ごとに複製して使う（重みは共有されるので複製は軽い）
    model: Mutex<LeafClassifier<B>>,
    device: B::Device,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(
        crop: CropType,
        model: LeafClassifier<B>,
        num_classes: usize,
        input_size: (u32, u32),
        device: B::Device,
    ) -> Self {
        let (width, height) = input_size;
        Self {
            crop,
            input_shape: [1, height as usize, width as usize, 3],
            num_classes,
            model: Mutex::new(model),
            device,
        }
    }

    /// `BinBytesRecorder` 形式の重みから分類器を復元
    pub fn from_record_bytes(
        crop: CropType,
        config: &LeafModelConfig,
        input_size: (u32, u32),
        model_binary: Vec<u8>,
        device: B::Device,
    ) -> Result<Self> {
        let model = config.init::<B>(&device);
        let expected_shapes = model.parameter_shapes();

        // BinBytesRecorder は壊れたバイト列に対してpanicする
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record: LeafClassifierRecord<B> =
            panic::catch_unwind(AssertUnwindSafe(|| recorder.load(model_binary, &device)))
                .map_err(|payload| {
                    PredictError::model_load(
                        crop,
                        format!("failed to read weights: {}", panic_message(payload)),
                    )
                })?
                .map_err(|e| PredictError::model_load(crop, format!("failed to read weights: {:?}", e)))?;

        let model = panic::catch_unwind(AssertUnwindSafe(|| model.load_record(record)))
            .map_err(|payload| {
                PredictError::model_load(
                    crop,
                    format!("weights do not fit the model: {}", panic_message(payload)),
                )
            })?;

        // load_record は形状を照合しない
        let loaded_shapes = model.parameter_shapes();
        if let Some(((name, expected), (_, actual))) = expected_shapes
            .iter()
            .zip(loaded_shapes.iter())
            .find(|((_, expected), (_, actual))| expected != actual)
        {
            return Err(PredictError::model_load(
                crop,
                format!(
                    "weights do not fit the model: {} is {:?} but {:?} is expected",
                    name, actual, expected
                ),
            ));
        }

        let classifier = Self::new(crop, model, config.num_classes, input_size, device);
        classifier.probe()?;
        Ok(classifier)
    }

    /// 空画像で一度順伝播し、出力幅がクラス数と一致するか確認
    fn probe(&self) -> Result<()> {
        let zeros = ImageTensor {
            shape: self.input_shape,
            data: vec![0.0; self.input_shape.iter().product()],
        };
        let output = self
            .predict_proba(&zeros)
            .map_err(|e| PredictError::model_load(self.crop, format!("probe forward pass failed: {}", e)))?;
        if output.len() != self.num_classes {
            return Err(PredictError::model_load(
                self.crop,
                format!(
                    "model produces {} outputs but {} classes are expected",
                    output.len(),
                    self.num_classes
                ),
            ));
        }
        Ok(())
    }
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn crop(&self) -> CropType {
        self.crop
    }

    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict_proba(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        if tensor.shape != self.input_shape || !tensor.is_consistent() {
            return Err(PredictError::Inference(format!(
                "input shape {:?} does not match expected {:?}",
                tensor.shape, self.input_shape
            )));
        }

        let model = self
            .model
            .lock()
            .map_err(|_| PredictError::Inference("model lock poisoned".to_string()))?
            .clone();

        let output = panic::catch_unwind(AssertUnwindSafe(|| {
            let input = Tensor::<B, 1>::from_floats(tensor.data.as_slice(), &self.device)
                .reshape(tensor.shape);
            model.predict_proba(input).into_data()
        }))
        .map_err(|payload| PredictError::Inference(panic_message(payload)))?;

        output
            .to_vec::<f32>()
            .map_err(|e| PredictError::Inference(format!("failed to read model output: {:?}", e)))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "forward pass panicked".to_string()
    }
}
