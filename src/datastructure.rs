/// Flat storage for a corpus: every token of every sentence lives in a single boxed slice, and
/// `indices` marks where each sentence starts and ends. Built for reducing cache misses when a
/// corpus is walked sentence by sentence.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub(crate) struct SentenceVecs<T> {
    pub(crate) tokens: Box<[T]>,
    pub(crate) indices: Box<[usize]>,
}

impl<T> Default for SentenceVecs<T> {
    fn default() -> Self {
        Self {
            tokens: Box::default(),
            indices: Box::new([0]),
        }
    }
}

impl<T> SentenceVecs<T> {
    pub(crate) fn new(vecs: Vec<Vec<T>>) -> Self {
        Self::from(vecs)
    }

    /// Number of tokens, all sentences included.
    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Number of sentences.
    pub(crate) fn sentence_count(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }

    /// Returns the tokens of the `n`th sentence.
    pub(crate) fn sentence(&self, n: usize) -> Option<&[T]> {
        let start = *self.indices.get(n)?;
        let end = *self.indices.get(n + 1)?;
        self.tokens.get(start..end)
    }
}

impl<T> From<Vec<Vec<T>>> for SentenceVecs<T> {
    #[inline(always)]
    fn from(value: Vec<Vec<T>>) -> Self {
        let length: usize = value.iter().map(|v| v.len()).sum();
        let mut flattened = Vec::with_capacity(length);
        let mut indices = Vec::with_capacity(value.len() + 1);
        indices.push(0);
        for vec in value.into_iter() {
            flattened.extend(vec);
            indices.push(flattened.len());
        }
        Self {
            tokens: flattened.into_boxed_slice(),
            indices: indices.into_boxed_slice(),
        }
    }
}

impl<'a, T> SentenceVecs<T> {
    pub(crate) fn iter_vec(&'a self) -> VecsIter<'a, T> {
        VecsIter::new(self)
    }
}

pub(crate) struct VecsIter<'a, T>
where
    T: 'a,
{
    indice_index: usize,
    sentence_vecs: &'a SentenceVecs<T>,
}

impl<'a, T> VecsIter<'a, T> {
    fn new(sentence_vecs: &'a SentenceVecs<T>) -> Self {
        Self {
            indice_index: 0,
            sentence_vecs,
        }
    }
}

impl<'a, T> Iterator for VecsIter<'a, T> {
    type Item = &'a [T];
    fn next(&mut self) -> Option<Self::Item> {
        let sentence = self.sentence_vecs.sentence(self.indice_index)?;
        self.indice_index += 1;
        Some(sentence)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .sentence_vecs
            .sentence_count()
            .saturating_sub(self.indice_index);
        (remaining, Some(remaining))
    }
}

impl<'a, T> ExactSizeIterator for VecsIter<'a, T> {}

/// This method allocates. It should only be used in the testing environment.
#[cfg(test)]
impl<T> From<SentenceVecs<T>> for Vec<Vec<T>>
where
    T: Clone,
{
    fn from(value: SentenceVecs<T>) -> Self {
        value.iter_vec().map(Vec::from).collect()
    }
}
