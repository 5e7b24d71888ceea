// Embedding strategies: text in, fixed-length vectors out.
//
// Two interchangeable implementations of TextEmbedder:
//   - tfidf: a lexical vocabulary fitted on the candidates' own texts
//   - semantic: a pretrained multilingual sentence encoder run through ONNX
//
// Vectors from different embedders (or different fits) live in different
// spaces and are never compared with each other.

pub mod download;
pub mod semantic;
pub mod tfidf;
pub mod traits;
