use davfs::{ClientPool, FileSystemProvider, Resolver, WebDavFs};
use davfs_proto::memory::MemoryFactory;
use davfs_proto::{ClientFactory, ClientOptions, DavClient, DavFuture};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Factory that takes a while to build each client.
#[derive(Default)]
struct SlowFactory {
    inner: MemoryFactory,
    constructions: AtomicUsize,
}

impl ClientFactory for SlowFactory {
    fn create<'a>(
        &'a self,
        origin: &'a str,
        options: &'a ClientOptions,
    ) -> DavFuture<'a, Arc<dyn DavClient>> {
        Box::pin(async move {
            self.constructions.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            self.inner.create(origin, options).await
        })
    }
}

/// Factory that blocks construction for one origin until released.
struct GatedFactory {
    inner: MemoryFactory,
    gated: String,
    gate: Notify,
}

impl ClientFactory for GatedFactory {
    fn create<'a>(
        &'a self,
        origin: &'a str,
        options: &'a ClientOptions,
    ) -> DavFuture<'a, Arc<dyn DavClient>> {
        Box::pin(async move {
            if origin == self.gated {
                self.gate.notified().await;
            }
            self.inner.create(origin, options).await
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_use_constructs_one_client() {
    let factory = Arc::new(SlowFactory::default());
    let pool = Arc::new(ClientPool::new(factory.clone()));
    let endpoint = Resolver::default()
        .resolve("webdav://alice:pw@dav.example/")
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let pool = pool.clone();
        let endpoint = endpoint.clone();
        handles.push(tokio::spawn(async move {
            pool.get_or_create(&endpoint.key, &endpoint.origin, &endpoint.options)
                .await
                .unwrap()
        }));
    }

    let mut clients = Vec::new();
    for handle in handles {
        clients.push(handle.await.unwrap());
    }

    assert_eq!(factory.constructions.load(Ordering::SeqCst), 1);
    assert_eq!(factory.inner.created(), 1);
    assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
    assert_eq!(pool.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_construction_does_not_block_other_endpoints() {
    let factory = Arc::new(GatedFactory {
        inner: MemoryFactory::new(),
        gated: "https://slow.example".into(),
        gate: Notify::new(),
    });
    let pool = Arc::new(ClientPool::new(factory.clone()));
    let resolver = Resolver::default();
    let slow = resolver.resolve("webdav://slow.example/").unwrap();
    let fast = resolver.resolve("webdav://fast.example/").unwrap();

    let pending = {
        let pool = pool.clone();
        let slow = slow.clone();
        tokio::spawn(async move {
            pool.get_or_create(&slow.key, &slow.origin, &slow.options)
                .await
                .map(|_| ())
        })
    };

    let client = tokio::time::timeout(
        Duration::from_secs(5),
        pool.get_or_create(&fast.key, &fast.origin, &fast.options),
    )
    .await
    .expect("unrelated endpoint was blocked")
    .unwrap();
    assert!(pool.get(&fast.key).is_some_and(|c| Arc::ptr_eq(&c, &client)));
    assert!(pool.get(&slow.key).is_none());

    factory.gate.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(pool.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_share_one_client() {
    let _ = env_logger::builder().is_test(true).try_init();
    let factory = Arc::new(SlowFactory::default());
    let fs = WebDavFs::new(factory.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let fs = fs.clone();
        handles.push(tokio::spawn(async move {
            fs.create_directory(&format!("webdav://dav.example/dir{i}"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(factory.constructions.load(Ordering::SeqCst), 1);
    let remote = factory.inner.remote("https://dav.example");
    for i in 0..8 {
        assert!(remote.is_dir(&format!("/dir{i}")));
    }
}
