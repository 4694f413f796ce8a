mod rag_ranking;
mod support;
