//! 백테스트 결과 저장소.
//!
//! 조회가 많고 쓰기는 결과 완료 시점에만 일어나므로 `RwLock`으로 보호합니다.
//! 값은 완성된 뒤에만 `Arc`로 감싸 넣기 때문에 부분적으로 만들어진 결과는
//! 노출되지 않습니다. 영속성은 보장하지 않습니다.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

struct StoreInner<V> {
    entries: HashMap<String, Arc<V>>,
    /// 삽입 순서
    order: Vec<String>,
}

/// ID로 결과를 보관하는 메모리 저장소.
pub struct ResultStore<V> {
    inner: RwLock<StoreInner<V>>,
}

impl<V> Default for ResultStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResultStore<V> {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                entries: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner<V>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("ResultStore RwLock poisoned (read), recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner<V>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("ResultStore RwLock poisoned (write), recovering");
                poisoned.into_inner()
            }
        }
    }

    /// 결과를 저장하고 공유 핸들을 반환합니다. 같은 ID가 있으면 교체합니다.
    pub fn insert(&self, id: impl Into<String>, value: V) -> Arc<V> {
        let id = id.into();
        let value = Arc::new(value);
        let mut inner = self.write();
        if inner.entries.insert(id.clone(), Arc::clone(&value)).is_none() {
            inner.order.push(id);
        }
        value
    }

    /// ID로 결과를 조회합니다.
    pub fn get(&self, id: &str) -> Option<Arc<V>> {
        self.read().entries.get(id).cloned()
    }

    /// 저장 여부.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// 저장된 ID 목록 (삽입 순서).
    pub fn ids(&self) -> Vec<String> {
        self.read().order.clone()
    }

    /// 저장된 결과 목록 (삽입 순서).
    pub fn list(&self) -> Vec<Arc<V>> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect()
    }

    /// 저장된 결과 수.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 모든 결과를 삭제하고 삭제된 수를 반환합니다.
    pub fn clear(&self) -> usize {
        let mut inner = self.write();
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.order.clear();
        debug!(removed, "Result store cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_clear() {
        let store = ResultStore::new();
        let a = store.insert("a", 1);
        store.insert("b", 2);

        assert_eq!(*a, 1);
        assert_eq!(store.get("b").as_deref(), Some(&2));
        assert!(store.get("c").is_none());
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);

        // 교체는 순서를 바꾸지 않는다
        store.insert("a", 10);
        assert_eq!(store.list().iter().map(|v| **v).collect::<Vec<_>>(), vec![10, 2]);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.insert(format!("{}-{}", t, i), i);
                        let _ = store.get(&format!("{}-{}", t, i / 2));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
