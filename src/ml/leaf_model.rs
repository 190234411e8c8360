//! 葉画像分類用CNNモデル
//!
//! 作物ごとに1つずつ学習される畳み込みネットワークの定義です。
//! 学習はこのクレートの対象外で、ここでは重みを読み込んで順伝播するための
//! 構造だけを持ちます。

use burn::{
    config::Config,
    module::{Module, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    tensor::{activation::softmax, backend::Backend, Tensor},
};

/// 畳み込み後に揃える特徴マップの一辺
const POOLED_SIZE: usize = 4;

/// 最終畳み込み層のチャネル数
const FEATURE_CHANNELS: usize = 128;

/// モデル設定
#[derive(Config, Debug)]
pub struct LeafModelConfig {
    /// 分類クラス数（作物のラベル数と一致させる）
    pub num_classes: usize,
    /// 全結合中間層の次元
    #[config(default = 256)]
    pub hidden_size: usize,
}

impl LeafModelConfig {
    /// モデルを初期化
    ///
    /// 畳み込みはsameパディングなので入力サイズに依存せず、
    /// 最後に適応平均プーリングで 4x4 に揃えてから全結合層へ渡します。
    pub fn init<B: Backend>(&self, device: &B::Device) -> LeafClassifier<B> {
        let d = FEATURE_CHANNELS * POOLED_SIZE * POOLED_SIZE;

        LeafClassifier {
            conv1: Conv2dConfig::new([3, 32], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),

            conv2: Conv2dConfig::new([32, 64], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),

            conv3: Conv2dConfig::new([64, FEATURE_CHANNELS], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            pool3: AdaptiveAvgPool2dConfig::new([POOLED_SIZE, POOLED_SIZE]).init(),

            fc1: LinearConfig::new(d, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),

            activation: Relu::new(),
        }
    }
}

/// 葉画像分類CNN
///
/// # アーキテクチャ
/// - {Conv 3x3 (same) + ReLU + MaxPool 2x2} x 2層
/// - Conv 3x3 (same) + ReLU + AdaptiveAvgPool 4x4
/// - FC: 2048 -> hidden + ReLU
/// - FC: hidden -> num_classes
/// - Softmax (予測時)
#[derive(Module, Debug)]
pub struct LeafClassifier<B: Backend> {
    conv1: Conv2d<B>, // 3 -> 32
    pool1: MaxPool2d,
    conv2: Conv2d<B>, // 32 -> 64
    pool2: MaxPool2d,
    conv3: Conv2d<B>, // 64 -> 128
    pool3: AdaptiveAvgPool2d,

    fc1: Linear<B>,
    fc2: Linear<B>,

    activation: Relu,
}

impl<B: Backend> LeafClassifier<B> {
    /// 順伝播
    ///
    /// # 引数
    /// - `images`: バッチ画像 [batch_size, height, width, 3]（前処理の出力そのまま）
    ///
    /// # 戻り値
    /// - クラスごとのロジット [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        // NHWC -> NCHW
        let x = images.permute([0, 3, 1, 2]);

        let x = self.conv1.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool1.forward(x);

        let x = self.conv2.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool2.forward(x);

        let x = self.conv3.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool3.forward(x);

        let [_, c, h, w] = x.dims();
        let x = x.reshape([batch_size, c * h * w]);

        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);

        self.fc2.forward(x)
    }

    /// 各パラメータの名前と形状
    ///
    /// 読み込んだ重みが設定どおりの構造かを確かめるのに使います。
    pub fn parameter_shapes(&self) -> Vec<(&'static str, Vec<usize>)> {
        fn bias<B: Backend>(bias: &Option<Param<Tensor<B, 1>>>) -> Vec<usize> {
            bias.as_ref().map(|b| b.val().dims().to_vec()).unwrap_or_default()
        }

        vec![
            ("conv1.weight", self.conv1.weight.val().dims().to_vec()),
            ("conv1.bias", bias(&self.conv1.bias)),
            ("conv2.weight", self.conv2.weight.val().dims().to_vec()),
            ("conv2.bias", bias(&self.conv2.bias)),
            ("conv3.weight", self.conv3.weight.val().dims().to_vec()),
            ("conv3.bias", bias(&self.conv3.bias)),
            ("fc1.weight", self.fc1.weight.val().dims().to_vec()),
            ("fc1.bias", bias(&self.fc1.bias)),
            ("fc2.weight", self.fc2.weight.val().dims().to_vec()),
            ("fc2.bias", bias(&self.fc2.bias)),
        ]
    }

    /// クラス確率 [batch_size, num_classes]
    pub fn predict_proba(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }
}
