//! モデルレジストリ
//!
//! 作物ごとに分類器を1つだけ読み込み、プロセスの寿命の間キャッシュします。
//!
//! - 読み込み済みの参照は `OnceLock` から取り出すのでロック不要
//! - 未読み込みの作物への同時アクセスは作物ごとの `Mutex` で直列化し、
//!   読み込みは作物あたり高々1回
//! - 読み込みに失敗してもスロットは空のまま（次の呼び出しで再試行される）

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, error};

use crate::crop::CropType;
use crate::error::Result;
use crate::ml::Classifier;
use crate::model::model_loader::ModelLoader;
use crate::model::model_routes::ModelRoutes;

#[derive(Default)]
struct Slot {
    classifier: OnceLock<Arc<dyn Classifier>>,
    load_lock: Mutex<()>,
}

/// 作物別分類器のキャッシュ
pub struct ModelRegistry {
    routes: ModelRoutes,
    loader: Box<dyn ModelLoader>,
    slots: [Slot; 5],
}

impl ModelRegistry {
    pub fn new(routes: ModelRoutes, loader: impl ModelLoader + 'static) -> Self {
        Self {
            routes,
            loader: Box::new(loader),
            slots: Default::default(),
        }
    }

    pub fn routes(&self) -> &ModelRoutes {
        &self.routes
    }

    /// 作物の分類器を取得（初回のみ読み込む）
    pub fn get_classifier(&self, crop: CropType) -> Result<Arc<dyn Classifier>> {
        let slot = &self.slots[crop.index()];
        if let Some(classifier) = slot.classifier.get() {
            return Ok(Arc::clone(classifier));
        }

        let _guard = slot.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // 待っている間に別スレッドが読み込みを終えている場合
        if let Some(classifier) = slot.classifier.get() {
            return Ok(Arc::clone(classifier));
        }

        let path = self.routes.path(crop);
        debug!(%crop, path = %path.display(), "loading model");
        let classifier = self.loader.load(crop, path).inspect_err(|e| {
            error!(%crop, error = %e, "model load failed");
        })?;

        Ok(Arc::clone(slot.classifier.get_or_init(|| classifier)))
    }

    /// 読み込み済みかどうか
    pub fn is_loaded(&self, crop: CropType) -> bool {
        self.slots[crop.index()].classifier.get().is_some()
    }

    /// 全作物のモデルを読み込む（最初の失敗で中断）
    pub fn preload_all(&self) -> Result<()> {
        for crop in CropType::ALL {
            self.get_classifier(crop)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::labels_for;
    use crate::error::PredictError;
    use crate::ml::ImageTensor;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubClassifier(CropType);

    impl Classifier for StubClassifier {
        fn crop(&self) -> CropType {
            self.0
        }

        fn input_shape(&self) -> [usize; 4] {
            [1, 4, 4, 3]
        }

        fn num_classes(&self) -> usize {
            labels_for(self.0).len()
        }

        fn predict_proba(&self, _tensor: &ImageTensor) -> Result<Vec<f32>> {
            Ok(vec![1.0 / self.num_classes() as f32; self.num_classes()])
        }
    }

    /// 読み込み回数を数えるローダー
    #[derive(Clone, Default)]
    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        failures_left: Arc<AtomicUsize>,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, crop: CropType, path: &Path) -> Result<Arc<dyn Classifier>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            let failed = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(PredictError::model_load(crop, format!("cannot read {}", path.display())));
            }
            Ok(Arc::new(StubClassifier(crop)))
        }
    }

    fn registry(loader: CountingLoader) -> ModelRegistry {
        let routes = ModelRoutes::in_dir(&PathBuf::from("unused")).unwrap();
        ModelRegistry::new(routes, loader)
    }

    #[test]
    fn test_loads_once_sequentially() {
        let loader = CountingLoader::default();
        let registry = registry(loader.clone());

        assert!(!registry.is_loaded(CropType::Tomato));
        let first = registry.get_classifier(CropType::Tomato).unwrap();
        let second = registry.get_classifier(CropType::Tomato).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(registry.is_loaded(CropType::Tomato));
        assert!(!registry.is_loaded(CropType::Apple));
    }

    #[test]
    fn test_loads_once_under_concurrent_first_access() {
        let loader = CountingLoader::default();
        let registry = registry(loader.clone());

        let classifiers: Vec<Arc<dyn Classifier>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.get_classifier(CropType::Corn).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        for classifier in &classifiers[1..] {
            assert!(Arc::ptr_eq(&classifiers[0], classifier));
        }
    }

    #[test]
    fn test_each_crop_has_its_own_slot() {
        let loader = CountingLoader::default();
        let registry = registry(loader.clone());

        registry.preload_all().unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 5);
        for crop in CropType::ALL {
            assert!(registry.is_loaded(crop));
            assert_eq!(registry.get_classifier(crop).unwrap().crop(), crop);
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_failed_load_does_not_poison_slot() {
        let loader = CountingLoader::default();
        loader.failures_left.store(1, Ordering::SeqCst);
        let registry = registry(loader.clone());

        let err = registry.get_classifier(CropType::Grape).err().unwrap();
        assert!(matches!(err, PredictError::ModelLoad { crop: CropType::Grape, .. }));
        assert!(!registry.is_loaded(CropType::Grape));

        let classifier = registry.get_classifier(CropType::Grape).unwrap();
        assert_eq!(classifier.crop(), CropType::Grape);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }
}
