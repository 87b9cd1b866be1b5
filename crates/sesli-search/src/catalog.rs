//! Catalog sources: the compiled-in technology catalog and JSON files.

use std::path::Path;

use sesli_core::types::SearchResult;

use crate::error::CatalogError;

/// The built-in Turkish technology article catalog.
pub fn builtin_catalog() -> Vec<SearchResult> {
    vec![
        SearchResult::new(
            1,
            "React Hooks Kullanımı",
            "React Hooks, fonksiyonel bileşenlerde state ve yaşam döngüsü özelliklerini kullanmanızı sağlar. useState ve useEffect en yaygın kullanılan hook'lardır.",
            0.95,
        ),
        SearchResult::new(
            2,
            "TypeScript ile Tip Güvenliği",
            "TypeScript, JavaScript'e statik tip tanımlama özelliği ekleyerek kod kalitesini artırır ve hataları azaltır. Interface ve generics gibi özellikler güçlü tip kontrolü sağlar.",
            0.88,
        ),
        SearchResult::new(
            3,
            "Node.js ve Express.js ile Backend Geliştirme",
            "Node.js, JavaScript'i sunucu tarafında çalıştırmanıza olanak tanır. Express.js ise Node.js üzerinde web uygulamaları geliştirmek için popüler bir framework'tür.",
            0.82,
        ),
        SearchResult::new(
            4,
            "Redux ile State Yönetimi",
            "Redux, React uygulamalarında karmaşık state yönetimini kolaylaştıran bir kütüphanedir. Actions, reducers ve store kavramlarıyla çalışır.",
            0.79,
        ),
        SearchResult::new(
            5,
            "GraphQL ve Apollo Client Kullanımı",
            "GraphQL, REST API'lere alternatif olarak geliştirilmiş bir sorgu dilidir. Apollo Client, GraphQL API'ler ile etkileşim kurmak için kullanılan güçlü bir istemci kütüphanesidir.",
            0.75,
        ),
        SearchResult::new(
            6,
            "React Native ile Mobil Uygulama Geliştirme",
            "React Native, tek kod tabanı ile iOS ve Android platformları için native mobil uygulamalar geliştirmenizi sağlar. JSX ve React'e benzer bir syntax kullanır.",
            0.72,
        ),
        SearchResult::new(
            7,
            "WebAssembly ile Performanslı Web Uygulamaları",
            "WebAssembly, tarayıcıda yüksek performanslı uygulamalar geliştirmek için kullanılan bir düşük seviyeli sanal makine. C++, C# gibi dillerde yazılan kodları derleyerek web uygulamalarına entegre edebilirsiniz.",
            0.69,
        ),
        SearchResult::new(
            8,
            "Next.js ile Server-Side Rendering (SSR)",
            "Next.js, React üzerine kurulu bir framework olup, SSR ve statik site oluşturma gibi özelliklerle performanslı ve SEO dostu web uygulamaları geliştirmenizi sağlar.",
            0.67,
        ),
        SearchResult::new(
            9,
            "Docker ile Konteynerizasyon",
            "Docker, uygulamalarınızı bağımsız ve taşınabilir konteynerler içinde çalıştırmanıza olanak tanır. Node.js uygulamalarınızı Docker ile konteynerize edebilirsiniz.",
            0.65,
        ),
        SearchResult::new(
            10,
            "Jest ile Unit Testing",
            "Jest, JavaScript kodlarını test etmek için kullanılan popüler bir test framework'üdür. React bileşenlerini ve diğer JavaScript kodlarını test etmek için idealdir.",
            0.63,
        ),
        SearchResult::new(
            11,
            "MongoDB ile NoSQL Veritabanı",
            "MongoDB, esnek bir NoSQL veritabanı olup, Node.js uygulamaları ile sıkça kullanılır. JSON benzeri bir belge yapısı kullanır.",
            0.61,
        ),
        SearchResult::new(
            12,
            "Serverless Mimari ile Fonksiyonel Programlama",
            "Serverless mimari, sunucu yönetimi yapmadan fonksiyonel olarak çalışan kod parçacıkları yazmanıza olanak tanır. AWS Lambda gibi platformlarda Node.js fonksiyonları çalıştırabilirsiniz.",
            0.59,
        ),
        SearchResult::new(
            13,
            "GraphQL Şemaları Tasarımı",
            "GraphQL şemaları, API'lerinizin yapısını tanımlar. TypeDefs ve resolvers kullanarak GraphQL şemaları oluşturabilirsiniz.",
            0.57,
        ),
        SearchResult::new(
            14,
            "TypeScript ile Generics",
            "TypeScript generics, kodunuzu daha esnek ve yeniden kullanılabilir hale getirmenizi sağlar. Fonksiyonlar ve sınıflar için generic tipler tanımlayabilirsiniz.",
            0.55,
        ),
        SearchResult::new(
            15,
            "React Context API ile State Yönetimi",
            "React Context API, büyük uygulamalarda state'i yukarıdan aşağıya doğru paylaşmak için kullanılan bir mekanizmadır. Redux'a alternatif olarak kullanılabilir.",
            0.53,
        ),
        SearchResult::new(
            16,
            "Webpack ile Modül Birleştirme",
            "Webpack, modern JavaScript uygulamalarında modülleri birleştirmek ve optimize etmek için kullanılan bir araçtır. React uygulamalarında sıkça kullanılır.",
            0.51,
        ),
        SearchResult::new(
            17,
            "Cypress ile End-to-End Testler",
            "Cypress, modern web uygulamaları için end-to-end testler yazmak için kullanılan bir test framework'üdür. React uygulamalarını tarayıcıda test etmek için idealdir.",
            0.49,
        ),
    ]
}

/// Load a catalog from a JSON array of `{id, title, content, relevanceScore}`.
pub fn load_catalog(path: &Path) -> Result<Vec<SearchResult>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    let results: Vec<SearchResult> = serde_json::from_str(&content)?;
    tracing::info!(path = %path.display(), entries = results.len(), "Catalog loaded");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 17);

        let ids: HashSet<u32> = catalog.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 17);

        for r in &catalog {
            assert!((0.0..=1.0).contains(&r.relevance_score()));
            assert!(!r.title().is_empty());
            assert!(!r.content().is_empty());
        }
    }

    #[test]
    fn test_builtin_catalog_is_score_ordered() {
        let catalog = builtin_catalog();
        for pair in catalog.windows(2) {
            assert!(pair[0].relevance_score() > pair[1].relevance_score());
        }
    }

    #[test]
    fn test_load_catalog_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"id": 1, "title": "Rust", "content": "Sahiplik modeli", "relevanceScore": 0.9},
                {"id": 2, "title": "Tokio", "content": "Async runtime", "relevanceScore": 0.8}
            ]"#,
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].title(), "Tokio");
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_load_catalog_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{\"id\": 1}]").unwrap();
        let result = load_catalog(file.path());
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }
}
