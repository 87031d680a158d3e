//! Loading the CSV fixtures and storing them in each backend.

mod common;

use podcast_core::services::{authentication, catalogue, reviews};
use podcast_core::{populate, verify_password, CsvDataReader, SearchFilter, User};

use common::{data_dir, empty_repositories};

#[test]
fn test_load_fixture_directory() {
    let dataset = CsvDataReader::load(data_dir()).expect("Failed to load fixtures");

    assert_eq!(dataset.podcasts.len(), 5);
    assert_eq!(dataset.episodes.len(), 5);
    assert_eq!(dataset.users.len(), 2);
    assert_eq!(dataset.reviews.len(), 4);

    let names: Vec<_> = dataset.authors.iter().map(|a| a.name()).collect();
    assert_eq!(
        names,
        vec![
            "Joe Toste",
            "Brian Denny",
            "Unknown Author",
            "USA Radio",
            "Bethel Presbyterian Church"
        ]
    );
    // the same category on two podcasts is one category
    let spirituality: Vec<_> = dataset
        .categories
        .iter()
        .filter(|c| c.name() == "Religion & Spirituality")
        .collect();
    assert_eq!(spirituality.len(), 1);
    assert_eq!(spirituality[0].podcast_ids(), &[3, 5]);

    let joe = &dataset.podcasts[0];
    assert_eq!(joe.episode_ids(), &[1, 2, 3]);
    assert_eq!(joe.number_of_reviews(), 2);

    let opening = &dataset.episodes[3];
    assert_eq!(opening.audio_link(), "Link Not Available");
    assert_eq!(opening.publish_date(), "Undated");

    // plain passwords are hashed, stored hashes are kept
    let thorke = &dataset.users[0];
    assert_ne!(thorke.password(), "pass1234");
    assert!(verify_password("pass1234", thorke.password()).unwrap());
    assert!(verify_password("pass1234", dataset.users[1].password()).unwrap());
}

#[test]
fn test_populate_skips_orphans() {
    let dataset = CsvDataReader::load(data_dir()).expect("Failed to load fixtures");

    for (name, repo) in empty_repositories() {
        let summary = populate(&dataset, repo.as_ref()).unwrap();
        assert_eq!(summary.podcasts, 5, "{}", name);
        assert_eq!(summary.episodes, 4, "{}", name);
        assert_eq!(summary.skipped_episodes, 1, "{}", name);
        assert_eq!(summary.reviews, 3, "{}", name);
        assert_eq!(summary.skipped_reviews, 1, "{}", name);

        assert_eq!(repo.get_number_of_podcasts().unwrap(), 5);
        assert_eq!(repo.get_user_count().unwrap(), 2);
        assert_eq!(repo.get_reviews().unwrap().len(), 3);
    }
}

#[test]
fn test_services_over_loaded_data() {
    let dataset = CsvDataReader::load(data_dir()).expect("Failed to load fixtures");

    for (name, repo) in empty_repositories() {
        let repo = repo.as_ref();
        populate(&dataset, repo).unwrap();

        authentication::authenticate_user(repo, "thorke", "pass1234")
            .unwrap_or_else(|e| panic!("{}: {}", name, e));
        let user = authentication::add_user(repo, "shyamli", "secret").unwrap();
        assert_eq!(user.id(), 2, "{}", name);
        authentication::authenticate_user(repo, "SHYAMLI", "secret").unwrap();

        reviews::add_review(repo, 4, "Buena musica", "shyamli", 5).unwrap();
        let views = reviews::get_reviews_for_podcast(repo, 4).unwrap();
        assert_eq!(views.len(), 1, "{}", name);
        assert_eq!(views[0].username, "shyamli");

        let found = catalogue::search_podcasts(repo, "business", SearchFilter::Category).unwrap();
        assert_eq!(found.len(), 1, "{}", name);
        assert_eq!(found[0].author, "Joe Toste");
        assert_eq!(found[0].categories, vec!["Business", "Education"]);
    }
}

#[test]
fn test_register_after_users_numbered_from_one() {
    for (name, repo) in empty_repositories() {
        let repo = repo.as_ref();
        repo.add_user(&User::new(1, "thorke", "pw").unwrap()).unwrap();

        let user = authentication::add_user(repo, "newbie", "secret").unwrap();
        assert_eq!(user.id(), 2, "{}", name);
        assert!(repo.get_user("newbie").unwrap().is_some(), "{}", name);
        assert_eq!(repo.get_user_count().unwrap(), 2, "{}", name);
        authentication::authenticate_user(repo, "newbie", "secret")
            .unwrap_or_else(|e| panic!("{}: {}", name, e));
    }
}
