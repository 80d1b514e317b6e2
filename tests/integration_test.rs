use std::sync::Arc;

use jd_shop_day::browser::open_portal;
use jd_shop_day::orchestrator::shop_day::ShopDay;
use jd_shop_day::utils::logging;
use jd_shop_day::{ChromePage, Config, PortalPage};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env().expect("加载配置失败");

    // 测试浏览器连接
    let result = open_portal(&config.browser).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_login_markers_present() {
    logging::init(true);

    let config = Config::from_env().expect("加载配置失败");
    let (browser, page) = open_portal(&config.browser)
        .await
        .expect("连接浏览器失败");
    let page = ChromePage::new(Arc::new(browser), page);

    // 首页至少应能查到登录标签或退出链接之一
    let tabs = page
        .count(jd_shop_day::services::login::LOGIN_TABS)
        .await
        .expect("查询登录标签失败");
    let logout = page
        .count(jd_shop_day::orchestrator::shop_day::LOGOUT_LINK)
        .await
        .expect("查询退出链接失败");
    assert!(tabs + logout > 0, "首页既没有登录标签也没有退出链接");
}

#[tokio::test]
#[ignore]
async fn test_shop_day_against_real_portal() {
    logging::init(true);

    let config = Config::from_env().expect("加载配置失败");
    config.validate().expect("缺少登录账号");
    let (browser, page) = open_portal(&config.browser)
        .await
        .expect("连接浏览器失败");
    let page = ChromePage::new(Arc::new(browser), page);

    let decoder = Arc::new(
        jd_shop_day::clients::HttpCaptchaDecoder::new(
            &config.captcha.decoder_url,
            std::time::Duration::from_secs(config.captcha.request_timeout_secs),
        )
        .expect("创建识别客户端失败"),
    );
    let sink = jd_shop_day::orchestrator::app::build_sink(&config.sink).expect("创建推送目标失败");
    let today = chrono::Local::now().date_naive();

    let outcome = ShopDay::new(&config, decoder, sink, today)
        .run(&page)
        .await
        .expect("抓取过程出错");

    println!("{:?}", outcome);
}

async fn local_chrome() -> (Arc<chromiumoxide::Browser>, ChromePage) {
    let mut config = Config::default().browser;
    config.home_url = "about:blank".to_string();
    let (browser, page) = jd_shop_day::browser::launch_browser(&config)
        .await
        .expect("启动浏览器失败");
    let browser = Arc::new(browser);
    let page = ChromePage::new(browser.clone(), page);
    (browser, page)
}

#[tokio::test]
#[ignore]
async fn test_frame_found_when_url_differs_from_src() {
    logging::init(true);
    let (_browser, page) = local_chrome().await;

    // srcdoc 的 frame url 是 about:srcdoc，与 src 属性不同
    page.page()
        .set_content(r#"<iframe id="loginFrame" srcdoc="<input id='loginname'>"></iframe>"#)
        .await
        .expect("写入页面失败");
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let frame = page
        .frame("#loginFrame")
        .await
        .expect("进入 iframe 出错")
        .expect("没有找到 iframe");
    assert_eq!(frame.count("input#loginname").await.unwrap(), 1);
    assert!(frame.set_value("input#loginname", "shop-admin").await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_detail_tab_is_closed() {
    logging::init(true);
    let (browser, page) = local_chrome().await;
    let before = browser.pages().await.unwrap().len();

    let detail = page
        .open_tab("data:text/html,<span class='wb-green'>等待出库</span>")
        .await
        .expect("打开标签页失败");
    assert_eq!(detail.text("span.wb-green").await.unwrap().as_deref(), Some("等待出库"));
    detail.close().await.expect("关闭标签页失败");
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    assert_eq!(browser.pages().await.unwrap().len(), before);
}
