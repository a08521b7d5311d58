// ============================================================
// Layer 5 — Bidirectional LSTM Encoder / LSTM Decoder (Burn)
// ============================================================
// Network layout for n_layers = 2:
//
//   source ids ─► embedding ─► [fw LSTM 0 | bw LSTM 0] ─► concat ─► [fw LSTM 1 | bw LSTM 1]
//                                  │          │                        │          │
//                               state 0    state 1                  state 2    state 3
//                                  ▼          ▼                        ▼          ▼
//   <GO> + target ─► embedding ─► dec 0 ──► dec 1 ─────────────────► dec 2 ──► dec 3 ─► linear ─► logits
//
// The decoder is a stack of 2 * n_layers LSTM cells; cell i starts
// from encoder state i. There is no attention.
//
// Padding: the encoder steps one time position at a time and only
// advances the state of rows whose true length covers that position,
// so the final state of every row is the state after its last real
// token. The backward direction reverses each row inside its own
// length, keeping the padding at the end.

use burn::{
    module::{ModuleMapper, Param},
    nn::{
        Embedding, EmbeddingConfig, Initializer,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::data::batcher::Seq2SeqBatch;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    /// Hidden size of every LSTM cell
    pub rnn_size: usize,
    /// Number of stacked bidirectional encoder layers
    pub n_layers: usize,
    pub encoder_embedding_dim: usize,
    pub decoder_embedding_dim: usize,
    /// Rows per batch; fixed for the lifetime of the model
    pub batch_size: usize,
    /// Gradient norm clipping threshold
    #[config(default = 5.0)]
    pub grad_clip: f64,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(
        &self,
        source_vocab_size: usize,
        target_vocab_size: usize,
        device:            &B::Device,
    ) -> Seq2SeqModel<B> {
        let encoder_embedding = EmbeddingConfig::new(source_vocab_size, self.encoder_embedding_dim).init(device);

        let encoder_input = |layer: usize| {
            if layer == 0 { self.encoder_embedding_dim } else { 2 * self.rnn_size }
        };
        let encoder_fw = (0..self.n_layers)
            .map(|l| lstm(encoder_input(l), self.rnn_size, device))
            .collect();
        let encoder_bw = (0..self.n_layers)
            .map(|l| lstm(encoder_input(l), self.rnn_size, device))
            .collect();

        let decoder_embedding = EmbeddingConfig::new(target_vocab_size, self.decoder_embedding_dim)
            .with_initializer(Initializer::Uniform { min: -1.0, max: 1.0 })
            .init(device);
        let decoder_cells = (0..2 * self.n_layers)
            .map(|i| {
                let d_input = if i == 0 { self.decoder_embedding_dim } else { self.rnn_size };
                lstm(d_input, self.rnn_size, device)
            })
            .collect();

        let projection = LinearConfig::new(self.rnn_size, target_vocab_size).init(device);

        Seq2SeqModel {
            encoder_embedding,
            encoder_fw,
            encoder_bw,
            decoder_embedding,
            decoder_cells,
            projection,
            rnn_size: self.rnn_size,
        }
    }
}

/// LSTM cell whose weight matrices start orthogonal; biases keep Burn's default.
fn lstm<B: Backend>(d_input: usize, d_hidden: usize, device: &B::Device) -> Lstm<B> {
    LstmConfig::new(d_input, d_hidden, true)
        .init(device)
        .map(&mut OrthogonalWeights)
}

struct OrthogonalWeights;

impl<B: Backend> ModuleMapper<B> for OrthogonalWeights {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        // Orthogonal init is only defined for matrices
        if D < 2 {
            return param;
        }
        param.map(|tensor| {
            let require_grad = tensor.is_require_grad();
            Initializer::Orthogonal { gain: 1.0 }
                .init::<B, D, _>(tensor.shape(), &tensor.device())
                .val()
                .set_require_grad(require_grad)
        })
    }
}

#[derive(Module, Debug)]
pub struct Seq2SeqModel<B: Backend> {
    pub encoder_embedding: Embedding<B>,
    pub encoder_fw:        Vec<Lstm<B>>,
    pub encoder_bw:        Vec<Lstm<B>>,
    pub decoder_embedding: Embedding<B>,
    pub decoder_cells:     Vec<Lstm<B>>,
    pub projection:        Linear<B>,
    pub rnn_size:          usize,
}

/// Cell and hidden state of one LSTM, each [batch, rnn_size].
#[derive(Debug, Clone)]
pub struct CellState<B: Backend> {
    pub cell:   Tensor<B, 2>,
    pub hidden: Tensor<B, 2>,
}

impl<B: Backend> CellState<B> {
    fn zeros(batch: usize, rnn_size: usize, device: &B::Device) -> Self {
        Self {
            cell:   Tensor::zeros([batch, rnn_size], device),
            hidden: Tensor::zeros([batch, rnn_size], device),
        }
    }

    fn to_lstm(&self) -> LstmState<B, 2> {
        LstmState::new(self.cell.clone(), self.hidden.clone())
    }
}

impl<B: Backend> From<LstmState<B, 2>> for CellState<B> {
    fn from(state: LstmState<B, 2>) -> Self {
        Self { cell: state.cell, hidden: state.hidden }
    }
}

impl<B: Backend> Seq2SeqModel<B> {
    pub fn n_layers(&self) -> usize {
        self.encoder_fw.len()
    }

    /// source: [batch, steps] → one final state per encoder direction and
    /// layer, ordered fw0, bw0, fw1, bw1, ...
    pub fn encode(&self, source: Tensor<B, 2, Int>, lengths: &[usize]) -> Vec<CellState<B>> {
        let [batch, steps] = source.dims();
        let device = source.device();

        if steps == 0 {
            return (0..2 * self.n_layers())
                .map(|_| CellState::zeros(batch, self.rnn_size, &device))
                .collect();
        }

        let lens: Vec<i32> = lengths.iter().map(|&l| l as i32).collect();
        let lens = Tensor::<B, 1, Int>::from_ints(lens.as_slice(), &device).reshape([batch, 1]);
        let active: Vec<Tensor<B, 2, Bool>> = (0..steps)
            .map(|t| lens.clone().greater_elem(t as i32).expand([batch, self.rnn_size]))
            .collect();
        let reverse = reversal_index::<B>(lengths, steps, &device);

        let mut inputs = self.encoder_embedding.forward(source);
        let mut states = Vec::with_capacity(2 * self.n_layers());

        for (fw, bw) in self.encoder_fw.iter().zip(&self.encoder_bw) {
            let (out_fw, state_fw) = self.run_masked(fw, inputs.clone(), &active);
            let reversed           = reverse_within_lengths(inputs, reverse.clone());
            let (out_bw, state_bw) = self.run_masked(bw, reversed, &active);
            let out_bw             = reverse_within_lengths(out_bw, reverse.clone());

            inputs = Tensor::cat(vec![out_fw, out_bw], 2);
            states.push(state_fw);
            states.push(state_bw);
        }

        states
    }

    /// Step `cell` over `inputs` [batch, steps, width], freezing each row's
    /// state once its length is exhausted and zeroing its outputs there.
    fn run_masked(
        &self,
        cell:   &Lstm<B>,
        inputs: Tensor<B, 3>,
        active: &[Tensor<B, 2, Bool>],
    ) -> (Tensor<B, 3>, CellState<B>) {
        let [batch, steps, width] = inputs.dims();
        let mut state   = CellState::zeros(batch, self.rnn_size, &inputs.device());
        let mut outputs = Vec::with_capacity(steps);

        for (t, active) in active.iter().enumerate().take(steps) {
            let x = inputs.clone().slice([0..batch, t..t + 1, 0..width]);
            let (_, next) = cell.forward(x, Some(state.to_lstm()));

            outputs.push(
                next.hidden.clone()
                    .mask_fill(active.clone().bool_not(), 0.0)
                    .unsqueeze_dim::<3>(1),
            );
            state = CellState {
                cell:   state.cell.mask_where(active.clone(), next.cell),
                hidden: state.hidden.mask_where(active.clone(), next.hidden),
            };
        }

        (Tensor::cat(outputs, 1), state)
    }

    /// Teacher-forced decoder pass: [batch, tgt_len] inputs → [batch, tgt_len, vocab] logits.
    pub fn forward(
        &self,
        source:         Tensor<B, 2, Int>,
        source_lengths: &[usize],
        decoder_input:  Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let states = self.encode(source, source_lengths);

        let mut x = self.decoder_embedding.forward(decoder_input);
        for (cell, state) in self.decoder_cells.iter().zip(&states) {
            let (out, _) = cell.forward(x, Some(state.to_lstm()));
            x = out;
        }
        self.projection.forward(x)
    }

    /// Masked mean cross-entropy over the real target positions.
    pub fn forward_loss(&self, batch: &Seq2SeqBatch<B>) -> Tensor<B, 1> {
        let logits = self.forward(
            batch.source.clone(),
            &batch.source_lengths,
            batch.decoder_input.clone(),
        );
        sequence_loss(logits, batch.target.clone(), batch.target_mask.clone())
    }

    /// Greedy decoding from <GO>: feed back the argmax token until every
    /// row has produced `eos_id` or `max_steps` steps have run.
    /// Each returned row ends with `eos_id` if it was produced.
    pub fn greedy_decode(
        &self,
        source:    Tensor<B, 2, Int>,
        lengths:   &[usize],
        go_id:     usize,
        eos_id:    usize,
        max_steps: usize,
    ) -> Vec<Vec<usize>> {
        let [batch, _] = source.dims();
        let device     = source.device();
        let mut states = self.encode(source, lengths);

        let mut tokens = Tensor::<B, 1, Int>::from_ints(vec![go_id as i32; batch].as_slice(), &device)
            .reshape([batch, 1]);
        let mut decoded  = vec![Vec::new(); batch];
        let mut finished = vec![false; batch];

        for _ in 0..max_steps {
            let mut x = self.decoder_embedding.forward(tokens);
            for (cell, state) in self.decoder_cells.iter().zip(states.iter_mut()) {
                let (out, next) = cell.forward(x, Some(state.to_lstm()));
                *state = next.into();
                x = out;
            }
            let next_ids = self.projection.forward(x).argmax(2).reshape([batch, 1]);

            let ids: Vec<i64> = next_ids.clone().into_data().iter::<i64>().collect();
            for (row, &id) in ids.iter().enumerate() {
                if finished[row] {
                    continue;
                }
                let id = id as usize;
                decoded[row].push(id);
                finished[row] = id == eos_id;
            }
            if finished.iter().all(|&f| f) {
                break;
            }
            tokens = next_ids;
        }

        decoded
    }
}

/// `sum(mask * -log p(target)) / sum(mask)` for logits [batch, steps, vocab].
pub fn sequence_loss<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
    mask:    Tensor<B, 2>,
) -> Tensor<B, 1> {
    let [batch, steps, _] = logits.dims();
    let log_probs = log_softmax(logits, 2);
    let picked    = log_probs
        .gather(2, targets.unsqueeze_dim::<3>(2))
        .reshape([batch, steps]);
    let weight = mask.clone().sum();
    (picked * mask).sum().neg() / weight
}

/// Per-row gather index that reverses the first `len` positions and
/// leaves the padded tail in place: len 3, steps 5 → [2 1 0 3 4].
fn reversal_index<B: Backend>(lengths: &[usize], steps: usize, device: &B::Device) -> Tensor<B, 2, Int> {
    let flat: Vec<i32> = lengths
        .iter()
        .flat_map(|&len| {
            let len = len.min(steps);
            (0..steps).map(move |t| if t < len { (len - 1 - t) as i32 } else { t as i32 })
        })
        .collect();
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([lengths.len(), steps])
}

fn reverse_within_lengths<B: Backend>(x: Tensor<B, 3>, index: Tensor<B, 2, Int>) -> Tensor<B, 3> {
    let [batch, steps, width] = x.dims();
    let index = index.unsqueeze_dim::<3>(2).expand([batch, steps, width]);
    x.gather(1, index)
}
